// src/cli/handlers/info.rs

// Small read-only actions: version, project dir, source path, shebang line.

use anyhow::Result;

use crate::{
    cli::{Cli, handlers::commons},
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
};

pub fn version() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// `--version`
pub fn handle_version(_cli: &Cli) -> Result<i32> {
    println!("{}", version());
    Ok(0)
}

/// `--bang`
pub fn handle_bang(_cli: &Cli) -> Result<i32> {
    println!("{}", commons::shebang_line());
    Ok(0)
}

/// `--dir`
pub fn handle_dir(_cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    println!("{}", ctx.root().display());
    Ok(0)
}

/// `--path`: prints nothing when the command has no active source.
pub fn handle_path(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let name = cli.path.as_deref().unwrap_or_default();
    if let Some(path) = store::existing_source_path(ctx, name) {
        println!("{}", path.display());
    }
    Ok(0)
}
