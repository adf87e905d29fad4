// src/cli/handlers/delete.rs

use anyhow::{Context, Result};

use crate::{
    cli::Cli,
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
};

/// `--delete <name>`: soft delete, undone by `--restore`.
pub fn handle(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let name = cli.delete.as_deref().unwrap_or_default();
    store::delete(ctx, name).with_context(|| format!(t!("delete.error.failed"), name = name))?;
    Ok(0)
}
