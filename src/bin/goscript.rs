// src/bin/goscript.rs

use anyhow::Result;
use clap::CommandFactory;
use colored::*;
use goscript::{
    cli::{Cli, CliError, dispatcher},
    core::diagnostics::Diagnostics,
    system::{executor::ExecutionError, toolchain::GoToolchain},
};
use std::io;

/// Entry point: sets up logging, parses arguments, dispatches, and turns the outcome
/// into the process exit code.
fn main() {
    env_logger::init();

    let cli = Cli::parse_from_env();
    let mut diagnostics = Diagnostics::new();
    let outcome: Result<i32> = dispatcher::dispatch(&cli, &GoToolchain, &mut diagnostics);

    let code = match outcome {
        Ok(code) => code,
        Err(e) => report(&e),
    };

    // Deferred warnings come last, whatever happened before.
    if let Err(e) = diagnostics.flush_to(&mut io::stderr()) {
        log::warn!("Could not print deferred warnings: {}", e);
    }
    std::process::exit(code);
}

/// Centralized error handling. Always yields exit code 1.
fn report(e: &anyhow::Error) -> i32 {
    // Interrupted runs exit quietly: the temporary command is already gone and the
    // child printed whatever it had to.
    if let Some(ExecutionError::Interrupted) = e.downcast_ref::<ExecutionError>() {
        log::debug!("Run interrupted by signal");
        return 1;
    }

    if let Some(CliError::MissingInput) = e.downcast_ref::<CliError>() {
        eprintln!("{}", Cli::command().render_help().ansi());
        return 1;
    }

    // `{:#}` keeps the underlying cause (e.g. the compiler output) after the context.
    eprintln!("\n{}: {:#}", "Error".red().bold(), e);
    1
}
