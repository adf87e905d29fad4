// src/cli/handlers/restore.rs

use anyhow::{Context, Result};

use crate::{
    cli::Cli,
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
};

/// `--restore <name>`: brings back a deleted or exported command and rebuilds it.
pub fn handle(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let name = cli.restore.as_deref().unwrap_or_default();
    store::restore(ctx, name).with_context(|| format!(t!("restore.error.failed"), name = name))?;
    Ok(0)
}
