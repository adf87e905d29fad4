//! goscript: compile and run Go snippets as named, reusable commands.
//!
//! The library is split the same way the binary flows: `core` holds the import
//! resolver, template rendering, source assembly, the command store and the
//! build orchestrator; `system` talks to the outside world (the Go toolchain
//! and child processes); `cli` maps command-line flags onto those operations.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
