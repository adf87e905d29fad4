// src/cli/handlers/edit.rs

use anyhow::{Result, anyhow};
use std::env;

use crate::{
    cli::Cli,
    constants::{EDITOR_ENV, EDITOR_OVERRIDE_ENV},
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
    system::executor,
};

/// `--edit <name>`: opens the source in the user's editor and waits for it.
///
/// The command is not rebuilt; run with `--name` (or `--recompile`) afterwards.
pub fn handle(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let name = cli.edit.as_deref().unwrap_or_default();
    let path = store::existing_source_path(ctx, name)
        .ok_or_else(|| anyhow!(t!("edit.error.not_found"), name = name))?;
    let editor = editor_command().ok_or_else(|| anyhow!(t!("edit.error.no_editor")))?;

    executor::execute_interactive(&editor, &path)?;
    Ok(0)
}

/// `$GOSCRIPT_EDITOR`, else `$EDITOR`. Empty values count as unset.
fn editor_command() -> Option<String> {
    [EDITOR_OVERRIDE_ENV, EDITOR_ENV]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}
