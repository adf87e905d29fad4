// src/cli/handlers/commons.rs

// Shared helpers for handlers that print sources.

use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::constants::APP_NAME;

/// How goscript was invoked, as it should appear in shebang lines and examples.
pub fn program_name() -> String {
    std::env::args()
        .next()
        .filter(|arg| !arg.is_empty())
        .unwrap_or_else(|| APP_NAME.to_string())
}

/// The interpreter line that makes a Go file runnable through goscript.
pub fn shebang_line() -> String {
    format!("#!/usr/bin/env -S {}", program_name())
}

/// Prints a source to stdout behind the shebang line, so it can be saved as a script.
pub fn print_script(source: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", shebang_line())
        .and_then(|()| out.write_all(source.as_bytes()))
        .and_then(|()| out.flush())
        .context(t!("common.error.stdout"))
}
