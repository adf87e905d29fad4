// src/cli/handlers/setup.rs

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    cli::{Cli, handlers::commons},
    core::setup,
    system::toolchain::Toolchain,
};

/// `--setup <dir>` creates a project; `--setup help` explains what that does.
pub fn handle(cli: &Cli, toolchain: &dyn Toolchain) -> Result<i32> {
    let target = cli.setup.as_deref().unwrap_or_default();
    if target == "help" {
        print!(
            "{}",
            format_args!(t!("setup.help"), bin = commons::program_name())
        );
        return Ok(0);
    }

    let project = setup::create_project(target, toolchain)
        .with_context(|| format!(t!("setup.error.failed"), dir = target))?;

    println!(
        "{} {}",
        t!("common.success").green().bold(),
        format_args!(
            t!("setup.success.created"),
            name = project.name,
            path = project.root.display()
        )
    );
    print!(
        "{}",
        format_args!(
            t!("setup.info.next_steps"),
            path = project.root.display(),
            bin = project.bin_dir.display()
        )
    );
    Ok(0)
}
