// src/core/paths.rs

use crate::constants::{
    BIN_DIR, MODULE_FILENAME, PROJECT_DIR_ENV, SOURCE_EXTENSION, SRC_DIR, TEMPLATE_FILENAME,
    USER_IMPORTS_FILENAME,
};
use crate::system::toolchain::Toolchain;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Directory specified by GOSCRIPT_PROJECT_DIR not found: {path}")]
    ProjectDirNotFound { path: String },
    #[error("Failed to expand GOSCRIPT_PROJECT_DIR value '{value}': {reason}")]
    Expansion { value: String, reason: String },
    #[error("Unable to get project path relative to executable: {0}")]
    ExecutableDir(#[source] std::io::Error),
    #[error("Could not create directory at '{path}': {source}")]
    DirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a single invocation needs to know about where it works and which tools it uses.
///
/// Built once in the binary and handed to every component by reference; nothing in the
/// crate reads the project location from the environment on its own.
pub struct ProjectContext<'t> {
    root: PathBuf,
    toolchain: &'t dyn Toolchain,
}

impl fmt::Debug for ProjectContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectContext")
            .field("root", &self.root)
            .field("toolchain", &self.toolchain)
            .finish()
    }
}

impl<'t> ProjectContext<'t> {
    /// Wraps an already known project root. No filesystem checks are made.
    pub fn new(root: impl Into<PathBuf>, toolchain: &'t dyn Toolchain) -> Self {
        Self {
            root: root.into(),
            toolchain,
        }
    }

    /// Resolves the project for this invocation.
    ///
    /// `GOSCRIPT_PROJECT_DIR` wins when set: it must exist, and its `src`/`bin`
    /// directories are created if missing. Otherwise the project is the directory
    /// holding the running executable.
    pub fn resolve(toolchain: &'t dyn Toolchain) -> Result<Self, PathError> {
        let root = match env::var(PROJECT_DIR_ENV) {
            Ok(value) if !value.trim().is_empty() => resolve_override(&value)?,
            _ => {
                let exe = env::current_exe().map_err(PathError::ExecutableDir)?;
                let exe = dunce::canonicalize(&exe).unwrap_or(exe);
                exe.parent().map(Path::to_path_buf).ok_or_else(|| {
                    PathError::ExecutableDir(std::io::Error::other(
                        "executable has no parent directory",
                    ))
                })?
            }
        };
        log::debug!("Project directory resolved to '{}'", root.display());
        Ok(Self::new(root, toolchain))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn toolchain(&self) -> &'t dyn Toolchain {
        self.toolchain
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join(SRC_DIR)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(TEMPLATE_FILENAME)
    }

    pub fn user_imports_path(&self) -> PathBuf {
        self.root.join(USER_IMPORTS_FILENAME)
    }

    pub fn module_path(&self) -> PathBuf {
        self.root.join(MODULE_FILENAME)
    }

    /// `<project>/src/<name>.go`
    pub fn source_path(&self, name: &str) -> PathBuf {
        self.src_dir()
            .join(format!("{}.{}", name, SOURCE_EXTENSION))
    }

    /// `<project>/src/<name>`: where a soft-deleted source lives.
    pub fn soft_deleted_path(&self, name: &str) -> PathBuf {
        self.src_dir().join(name)
    }

    /// `<project>/bin/<name>`
    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.bin_dir().join(name)
    }
}

fn resolve_override(value: &str) -> Result<PathBuf, PathError> {
    // `~` and `$VAR` are expanded so the variable can be set literally in shell profiles.
    let expanded = shellexpand::full(value).map_err(|e| PathError::Expansion {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    let root = PathBuf::from(expanded.into_owned());
    if !root.exists() {
        return Err(PathError::ProjectDirNotFound {
            path: root.display().to_string(),
        });
    }
    let root = dunce::canonicalize(&root).unwrap_or(root);
    for dir in [root.join(SRC_DIR), root.join(BIN_DIR)] {
        ensure_dir(&dir)?;
    }
    Ok(root)
}

/// Creates `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), PathError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| PathError::DirCreation {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::toolchain::GoToolchain;
    use tempfile::tempdir;

    #[test]
    fn test_layout_paths() {
        let ctx = ProjectContext::new("/tmp/proj", &GoToolchain);
        assert_eq!(ctx.source_path("hello"), PathBuf::from("/tmp/proj/src/hello.go"));
        assert_eq!(ctx.soft_deleted_path("hello"), PathBuf::from("/tmp/proj/src/hello"));
        assert_eq!(ctx.binary_path("hello"), PathBuf::from("/tmp/proj/bin/hello"));
        assert_eq!(ctx.template_path(), PathBuf::from("/tmp/proj/script.tmpl"));
        assert_eq!(ctx.user_imports_path(), PathBuf::from("/tmp/proj/imports.json"));
        assert_eq!(ctx.module_path(), PathBuf::from("/tmp/proj/go.mod"));
    }

    #[test]
    fn test_override_creates_src_and_bin() {
        let dir = tempdir().unwrap();
        let root = resolve_override(dir.path().to_str().unwrap()).unwrap();
        assert!(root.join("src").is_dir());
        assert!(root.join("bin").is_dir());
    }

    #[test]
    fn test_override_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = resolve_override(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PathError::ProjectDirNotFound { .. }));
    }
}
