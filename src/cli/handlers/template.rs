// src/cli/handlers/template.rs

use anyhow::{Context, Result};

use crate::{
    cli::{Cli, handlers::commons},
    core::{assembler, diagnostics::Diagnostics, paths::ProjectContext, store},
};

/// `--template`: the full program generated for `--code` (an empty `main` without it).
///
/// Printed as a script, or saved as the source of `--name` without compiling, as a
/// starting point for a longer command.
pub fn handle(cli: &Cli, ctx: &ProjectContext<'_>, diagnostics: &mut Diagnostics) -> Result<i32> {
    let code = cli.code.as_deref().unwrap_or_default();
    let assembled = assembler::assemble(ctx, code)?;
    if let Some(message) = &assembled.format_error {
        diagnostics.defer(t!("run.warning.format_failed"), message);
    }

    match cli.name.as_deref() {
        Some(name) => {
            let path = store::save(ctx, name, &assembled.source)
                .with_context(|| format!(t!("run.error.save_failed"), name = name))?;
            println!("{}", format_args!(t!("template.success.saved"), path = path.display()));
        }
        None => commons::print_script(&assembled.source)?,
    }
    Ok(0)
}
