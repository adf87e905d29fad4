// src/cli/handlers/recompile.rs

use anyhow::{Context, Result};

use crate::{
    cli::Cli,
    core::{builder, diagnostics::Diagnostics, paths::ProjectContext},
};

/// `--recompile`: rebuilds all active commands, e.g. after upgrading Go.
pub fn handle(_cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let rebuilt = builder::recompile_all(ctx).context(t!("recompile.error.failed"))?;
    log::info!("Recompiled {} command(s)", rebuilt);
    Ok(0)
}
