// src/cli/handlers/cat.rs

use anyhow::{Context, Result};

use crate::{
    cli::{Cli, handlers::commons},
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
};

/// `--cat <name>`: prints the source as a script, or with `--name` saves a copy under
/// that name. The source command stays as it is.
pub fn handle(cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let from = cli.cat.as_deref().unwrap_or_default();

    if let Some(to) = cli.name.as_deref() {
        store::copy(ctx, from, to)
            .with_context(|| format!(t!("cat.error.copy_failed"), from = from, to = to))?;
        println!("{}", format_args!(t!("cat.success.copied"), from = from, to = to));
        return Ok(0);
    }

    let source =
        store::read(ctx, from).with_context(|| format!(t!("cat.error.read_failed"), name = from))?;
    commons::print_script(&source)?;
    Ok(0)
}
