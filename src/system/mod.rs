//! # System Interaction Layer
//!
//! The boundary between goscript's logic and the processes it drives.
//!
//! ## Modules
//!
//! - **`executor`**: Blocking helpers that run a tool to completion and capture what it
//!   printed, feed text through a filter such as `gofmt`, or hand the terminal to an
//!   editor.
//! - **`toolchain`**: The `Toolchain` trait describing the Go commands goscript needs,
//!   and `GoToolchain`, its implementation on top of `executor`.
//! - **`launcher`**: Runs a built command, either sharing the terminal or with piped
//!   input and captured output, and gives up waiting when the user interrupts.
//! - **`interrupt`**: SIGINT/SIGTERM listeners, and `InterruptWatch`, which keeps one
//!   installed while a temporary command exists so its files can still be removed.

pub mod executor;
pub mod interrupt;
pub mod launcher;
pub mod toolchain;
