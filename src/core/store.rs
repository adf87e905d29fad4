//! # Command Store
//!
//! The registry of commands under `<project>/src` and `<project>/bin`.
//!
//! A command is *active* while its source keeps the `.go` extension and its binary
//! exists. Delete and export are soft: the extension is stripped (so `go build` and
//! listings skip it) and the binary removed, which `restore` can undo.
//!
//! Every mutation is a single filesystem step without rollback. If one step of a
//! transition fails, the earlier steps stay applied and the error is reported; the
//! store remains inspectable with `--list`.

use crate::constants::SOURCE_EXTENSION;
use crate::core::assembler::{self, AssembleError};
use crate::core::builder::{self, BuildError};
use crate::core::imports::{self, ImportError};
use crate::core::paths::ProjectContext;
use crate::models::{CommandEntry, CommandState};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("'{0}' is not a valid command name.")]
    InvalidName(String),
    #[error("Command '{0}' was not found in the project src directory.")]
    NotFound(String),
    #[error("Command '{0}' has no deleted source to restore.")]
    NothingToRestore(String),
    #[error("Command '{0}' has no compiled binary.")]
    NoBinary(String),
    #[error("Command '{name}' already has a deleted source at '{path}'. Restore or remove it first.")]
    DeletedCopyExists { name: String, path: String },
    #[error("Command '{0}' is active. Delete it before restoring its old source.")]
    AlreadyActive(String),
    #[error("Filesystem error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Source(#[from] AssembleError),
    #[error(transparent)]
    Tidy(#[from] ImportError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

type StoreResult<T> = Result<T, StoreError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Rejects names that would escape `src/` or `bin/`.
pub fn validate_name(name: &str) -> StoreResult<&str> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains(char::is_whitespace);
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// All commands, sorted by file name. Sources without the `.go` extension are soft-deleted.
pub fn list(ctx: &ProjectContext<'_>) -> StoreResult<Vec<CommandEntry>> {
    let src_dir = ctx.src_dir();
    let mut file_names = Vec::new();
    for entry in fs::read_dir(&src_dir).map_err(io_error(&src_dir))? {
        let entry = entry.map_err(io_error(&src_dir))?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            file_names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    file_names.sort();

    let suffix = format!(".{}", SOURCE_EXTENSION);
    Ok(file_names
        .into_iter()
        .map(|file_name| match file_name.strip_suffix(&suffix) {
            Some(name) => CommandEntry {
                name: name.to_string(),
                state: CommandState::Active,
            },
            None => CommandEntry {
                name: file_name,
                state: CommandState::SoftDeleted,
            },
        })
        .collect())
}

/// The source path of an active command, if it exists.
pub fn existing_source_path(ctx: &ProjectContext<'_>, name: &str) -> Option<PathBuf> {
    let name = validate_name(name).ok()?;
    let path = ctx.source_path(name);
    path.is_file().then_some(path)
}

/// Writes `<project>/src/<name>.go`, replacing any previous version.
pub fn save(ctx: &ProjectContext<'_>, name: &str, source: &str) -> StoreResult<PathBuf> {
    let name = validate_name(name)?;
    let path = ctx.source_path(name);
    fs::write(&path, source).map_err(io_error(&path))?;
    log::debug!("Saved source for '{}' to '{}'", name, path.display());
    Ok(path)
}

/// Reads an active command's source, without any interpreter line.
pub fn read(ctx: &ProjectContext<'_>, name: &str) -> StoreResult<String> {
    let name = validate_name(name)?;
    let path = ctx.source_path(name);
    if !path.is_file() {
        return Err(StoreError::NotFound(name.to_string()));
    }
    Ok(assembler::read_source_file(&path)?)
}

/// Saves a copy of `from`'s source as command `to`. The copy is not compiled.
pub fn copy(ctx: &ProjectContext<'_>, from: &str, to: &str) -> StoreResult<PathBuf> {
    let source = read(ctx, from)?;
    save(ctx, to, &source)
}

/// Soft delete: strips the extension from the source, removes the binary, tidies `go.mod`.
pub fn delete(ctx: &ProjectContext<'_>, name: &str) -> StoreResult<()> {
    let name = validate_name(name)?;
    let src = ctx.source_path(name);
    if !src.is_file() {
        return Err(StoreError::NotFound(name.to_string()));
    }
    let parked = ensure_no_deleted_copy(ctx, name)?;
    fs::rename(&src, &parked).map_err(io_error(&src))?;

    let bin = ctx.binary_path(name);
    match fs::remove_file(&bin) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("No binary to remove for '{}' at '{}'", name, bin.display());
        }
        Err(e) => return Err(io_error(&bin)(e)),
    }

    // Dropping a source may leave modules in go.mod that nothing requires anymore.
    imports::tidy(ctx)?;
    log::info!("Command '{}' deleted (source kept as '{}')", name, parked.display());
    Ok(())
}

/// Undoes a delete or export: restores the extension and rebuilds the binary.
pub fn restore(ctx: &ProjectContext<'_>, name: &str) -> StoreResult<PathBuf> {
    let name = validate_name(name)?;
    let parked = ctx.soft_deleted_path(name);
    if !parked.is_file() {
        return Err(StoreError::NothingToRestore(name.to_string()));
    }
    let src = ctx.source_path(name);
    if src.exists() {
        return Err(StoreError::AlreadyActive(name.to_string()));
    }
    fs::rename(&parked, &src).map_err(io_error(&parked))?;

    let bin = ctx.binary_path(name);
    builder::compile_binary(ctx, &src, &bin)?;
    log::info!("Command '{}' restored", name);
    Ok(bin)
}

/// Returns where `name` would be parked, failing if an older deleted source sits there.
fn ensure_no_deleted_copy(ctx: &ProjectContext<'_>, name: &str) -> StoreResult<PathBuf> {
    let parked = ctx.soft_deleted_path(name);
    if parked.exists() {
        return Err(StoreError::DeletedCopyExists {
            name: name.to_string(),
            path: parked.display().to_string(),
        });
    }
    Ok(parked)
}

/// Writes the command's source to `out`, prefixed with `shebang`, then deletes the command.
pub fn export(
    ctx: &ProjectContext<'_>,
    name: &str,
    out: &mut dyn Write,
    shebang: &str,
) -> StoreResult<()> {
    let source = read(ctx, name)?;
    ensure_no_deleted_copy(ctx, validate_name(name)?)?;
    let write_failed = |e: io::Error| StoreError::Io {
        path: "<output>".to_string(),
        source: e,
    };
    writeln!(out, "{}", shebang).map_err(write_failed)?;
    out.write_all(source.as_bytes()).map_err(write_failed)?;
    out.flush().map_err(write_failed)?;
    delete(ctx, name)
}

/// Copies the binary into `dest_dir` (executable for everyone in the owner's group),
/// then deletes the command.
pub fn export_binary(ctx: &ProjectContext<'_>, name: &str, dest_dir: &Path) -> StoreResult<PathBuf> {
    let name = validate_name(name)?;
    let bin = ctx.binary_path(name);
    if !bin.is_file() {
        return Err(StoreError::NoBinary(name.to_string()));
    }
    ensure_no_deleted_copy(ctx, name)?;
    let dest = dest_dir.join(name);
    fs::copy(&bin, &dest).map_err(io_error(&dest))?;
    set_exported_permissions(&dest)?;
    delete(ctx, name)?;
    Ok(dest)
}

#[cfg(unix)]
fn set_exported_permissions(path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o766)).map_err(io_error(path))
}

#[cfg(not(unix))]
fn set_exported_permissions(_path: &Path) -> StoreResult<()> {
    Ok(())
}

/// Removes everything a temporary command left behind. Missing files are fine.
pub fn cleanup_temporary(ctx: &ProjectContext<'_>, name: &str) -> StoreResult<()> {
    for path in [ctx.source_path(name), ctx.binary_path(name)] {
        match fs::remove_file(&path) {
            Ok(()) => log::trace!("Removed temporary file '{}'", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&path)(e)),
        }
    }
    Ok(())
}
