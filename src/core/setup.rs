// src/core/setup.rs

use crate::constants::{BIN_DIR, DEFAULT_PACKAGE, DEFAULT_TEMPLATE, SRC_DIR, TEMPLATE_FILENAME};
use crate::system::executor::ExecutionError;
use crate::system::toolchain::Toolchain;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Unable to create project at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' has no usable directory name for the Go module.")]
    InvalidName(String),
    #[error("'{step}' failed while setting up the project: {source}")]
    Toolchain {
        step: String,
        #[source]
        source: ExecutionError,
    },
}

/// The result of a successful setup, for the caller to print instructions from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub root: PathBuf,
    pub bin_dir: PathBuf,
}

/// Creates a goscript project at `dir` (relative paths are taken from the working directory).
///
/// The module is named after the directory, gets the default script package, the
/// `src`/`bin` layout and the default `script.tmpl`. Re-running on an existing
/// project fails at `go mod init`, leaving it untouched.
pub fn create_project(dir: &str, toolchain: &dyn Toolchain) -> Result<NewProject, SetupError> {
    let root = absolutize(Path::new(dir))?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| SetupError::InvalidName(dir.to_string()))?;

    create_dir(&root)?;
    log::info!("Initialising module '{}' in '{}'", name, root.display());
    toolchain
        .init_module(&root, &name)
        .map_err(|e| SetupError::Toolchain {
            step: format!("go mod init {}", name),
            source: e,
        })?;
    toolchain
        .get(&root, DEFAULT_PACKAGE)
        .map_err(|e| SetupError::Toolchain {
            step: format!("go get {}", DEFAULT_PACKAGE),
            source: e,
        })?;

    let bin_dir = root.join(BIN_DIR);
    create_dir(&root.join(SRC_DIR))?;
    create_dir(&bin_dir)?;

    let template = root.join(TEMPLATE_FILENAME);
    fs::write(&template, DEFAULT_TEMPLATE).map_err(|e| SetupError::Io {
        path: template.display().to_string(),
        source: e,
    })?;

    Ok(NewProject {
        name,
        root,
        bin_dir,
    })
}

fn absolutize(dir: &Path) -> Result<PathBuf, SetupError> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| SetupError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    Ok(cwd.join(dir))
}

fn create_dir(dir: &Path) -> Result<(), SetupError> {
    fs::create_dir_all(dir).map_err(|e| SetupError::Io {
        path: dir.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::toolchain::testing::FakeToolchain;
    use tempfile::tempdir;

    #[test]
    fn test_create_project_layout() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("scripts");
        let toolchain = FakeToolchain::default();

        let project = create_project(target.to_str().unwrap(), &toolchain).unwrap();
        assert_eq!(project.name, "scripts");
        assert_eq!(project.bin_dir, target.join("bin"));
        assert!(target.join("src").is_dir());
        assert!(target.join("bin").is_dir());
        assert_eq!(
            fs::read_to_string(target.join("script.tmpl")).unwrap(),
            DEFAULT_TEMPLATE
        );
        assert_eq!(
            toolchain.calls(),
            vec!["init scripts", "get github.com/bitfield/script"]
        );
    }

    #[test]
    fn test_failed_fetch_aborts_setup() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("scripts");
        let mut toolchain = FakeToolchain::default();
        toolchain
            .broken_packages
            .insert(DEFAULT_PACKAGE.to_string());

        let err = create_project(target.to_str().unwrap(), &toolchain).unwrap_err();
        assert!(matches!(err, SetupError::Toolchain { .. }));
        assert!(!target.join("script.tmpl").exists());
    }
}
