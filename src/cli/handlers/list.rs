// src/cli/handlers/list.rs

use anyhow::{Context, Result};

use crate::{
    cli::Cli,
    core::{diagnostics::Diagnostics, paths::ProjectContext, store},
};

/// `--list`: one command per line; soft-deleted ones are flagged.
pub fn handle(_cli: &Cli, ctx: &ProjectContext<'_>, _: &mut Diagnostics) -> Result<i32> {
    let entries = store::list(ctx).context(t!("list.error.read_failed"))?;
    for entry in entries {
        println!("{}", entry);
    }
    Ok(0)
}
