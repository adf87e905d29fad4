// src/cli/handlers/modules.rs

// Go module maintenance: `--goget` and `--gotidy`.

use anyhow::{Context, Result};

use crate::{
    cli::Cli,
    core::{diagnostics::Diagnostics, imports, paths::ProjectContext},
};

/// `--goget <package>`: fetches it and records its alias for import inference.
pub fn handle_get(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let package = cli.goget.as_deref().unwrap_or_default();
    let alias = imports::fetch_package(ctx, package)
        .with_context(|| format!(t!("goget.error.failed"), package = package))?;
    log::info!("'{}' is now available as '{}'", package, alias);
    Ok(0)
}

/// `--gotidy`
pub fn handle_tidy(_cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    imports::tidy(ctx)?;
    Ok(0)
}
