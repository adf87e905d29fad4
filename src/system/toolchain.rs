// src/system/toolchain.rs

use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::Path;

use crate::system::executor::{self, ExecutionError};

/// The external Go tools, as far as goscript relies on them.
///
/// Every method either succeeds with the tool's output or fails with an
/// `ExecutionError` whose `output()` holds the tool's diagnostics.
pub trait Toolchain: Debug {
    /// `go build -o <bin> <src>`, run from the project root.
    fn build(&self, root: &Path, src: &Path, bin: &Path) -> Result<String, ExecutionError>;

    /// `go get <package>`, run from the project root.
    fn get(&self, root: &Path, package: &str) -> Result<String, ExecutionError>;

    /// `go mod tidy`, run from the project root.
    fn tidy(&self, root: &Path) -> Result<String, ExecutionError>;

    /// `go mod init <name>`, run from a new project root.
    fn init_module(&self, root: &Path, name: &str) -> Result<String, ExecutionError>;

    /// Canonical formatting of a complete source unit.
    fn format(&self, source: &str) -> Result<String, ExecutionError>;
}

/// The real `go` and `gofmt` binaries found on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoToolchain;

impl Toolchain for GoToolchain {
    fn build(&self, root: &Path, src: &Path, bin: &Path) -> Result<String, ExecutionError> {
        executor::execute_and_capture_output(
            "go",
            &[
                OsStr::new("build"),
                OsStr::new("-o"),
                bin.as_os_str(),
                src.as_os_str(),
            ],
            root,
        )
    }

    fn get(&self, root: &Path, package: &str) -> Result<String, ExecutionError> {
        executor::execute_and_capture_output("go", &["get", package], root)
    }

    fn tidy(&self, root: &Path) -> Result<String, ExecutionError> {
        executor::execute_and_capture_output("go", &["mod", "tidy"], root)
    }

    fn init_module(&self, root: &Path, name: &str) -> Result<String, ExecutionError> {
        executor::execute_and_capture_output("go", &["mod", "init", name], root)
    }

    fn format(&self, source: &str) -> Result<String, ExecutionError> {
        executor::execute_with_input("gofmt", &[] as &[&str], source)
    }
}
