// src/cli/handlers/export.rs

// Moving a command out of the project: as a script (`--export`) or as a binary
// (`--export-bin`). Both leave the command soft-deleted so `--restore` still works.

use anyhow::{Context, Result};
use std::env;
use std::io;

use crate::{
    cli::{Cli, handlers::commons},
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
};

/// `--export <name>`: source with shebang line to stdout.
pub fn handle_source(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let name = cli.export.as_deref().unwrap_or_default();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    store::export(ctx, name, &mut out, &commons::shebang_line())
        .with_context(|| format!(t!("export.error.failed"), name = name))?;
    Ok(0)
}

/// `--export-bin <name>`: binary into the current directory.
pub fn handle_binary(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let name = cli.export_bin.as_deref().unwrap_or_default();
    let dest_dir = env::current_dir().context(t!("export.error.no_cwd"))?;
    let dest = store::export_binary(ctx, name, &dest_dir)
        .with_context(|| format!(t!("export.error.failed"), name = name))?;
    log::info!("Exported binary to '{}'", dest.display());
    Ok(0)
}
