//! # Build Orchestrator
//!
//! Compiles a stored source into `<project>/bin`. When the compiler reports packages
//! that are not in the module yet, they are fetched and the build is retried.

use crate::core::imports::{self, ImportError};
use crate::core::paths::ProjectContext;
use crate::core::store::{self, StoreError};
use crate::models::CommandState;
use crate::system::executor::ExecutionError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

lazy_static! {
    // `go build` ends a missing-module diagnostic with a suggested `go get <path>` line.
    static ref MISSING_PACKAGE_RE: Regex = Regex::new(r"go get (.+)").unwrap();
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Compilation failed:\n{diagnostics}")]
    Compile { diagnostics: String },
    #[error(transparent)]
    Fetch(#[from] ImportError),
    #[error("Could not run the Go compiler: {0}")]
    Toolchain(#[source] ExecutionError),
    #[error("Could not list the project commands: {0}")]
    Listing(#[source] Box<StoreError>),
}

/// What a failed build means for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFailure {
    /// Distinct packages the compiler suggests fetching, in order of appearance.
    MissingPackages(Vec<String>),
    /// Anything else: a real error in the program.
    Terminal,
}

/// Classifies compiler output. This is the only place that knows the diagnostic wording.
pub fn classify_build_failure(output: &str) -> BuildFailure {
    let mut seen = HashSet::new();
    let packages: Vec<String> = MISSING_PACKAGE_RE
        .captures_iter(output)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|pkg| !pkg.is_empty() && seen.insert(pkg.clone()))
        .collect();

    if packages.is_empty() {
        BuildFailure::Terminal
    } else {
        BuildFailure::MissingPackages(packages)
    }
}

/// Builds `src` into `bin`, fetching missing packages between attempts.
///
/// Each package is fetched at most once per call. A failed fetch ends the build, and so
/// does a failure that only names packages already fetched, since another attempt would
/// produce the same diagnostics.
pub fn compile_binary(ctx: &ProjectContext<'_>, src: &Path, bin: &Path) -> Result<(), BuildError> {
    let mut fetched: HashSet<String> = HashSet::new();

    loop {
        log::debug!("Compiling '{}' into '{}'", src.display(), bin.display());
        let err = match ctx.toolchain().build(ctx.root(), src, bin) {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };
        let Some(diagnostics) = err.output().map(str::to_string) else {
            return Err(BuildError::Toolchain(err));
        };

        let packages = match classify_build_failure(&diagnostics) {
            BuildFailure::Terminal => return Err(BuildError::Compile { diagnostics }),
            BuildFailure::MissingPackages(packages) => packages,
        };
        let new_packages: Vec<String> = packages
            .into_iter()
            .filter(|pkg| !fetched.contains(pkg))
            .collect();
        if new_packages.is_empty() {
            log::debug!("Compiler still reports already fetched packages; giving up.");
            return Err(BuildError::Compile { diagnostics });
        }

        for package in new_packages {
            log::info!("Fetching missing package '{}'", package);
            imports::fetch_package(ctx, &package)?;
            fetched.insert(package);
        }
    }
}

/// Rebuilds every active command. Stops at the first failure and returns how many
/// commands were rebuilt before it.
pub fn recompile_all(ctx: &ProjectContext<'_>) -> Result<usize, BuildError> {
    let entries = store::list(ctx).map_err(|e| BuildError::Listing(Box::new(e)))?;
    let mut rebuilt = 0;
    for entry in entries
        .iter()
        .filter(|entry| entry.state == CommandState::Active)
    {
        log::info!("Recompiling '{}'", entry.name);
        compile_binary(
            ctx,
            &ctx.source_path(&entry.name),
            &ctx.binary_path(&entry.name),
        )?;
        rebuilt += 1;
    }
    Ok(rebuilt)
}
