// src/core/diagnostics.rs

use colored::Colorize;
use std::fmt;
use std::io::{self, Write};

/// Non-fatal problems noticed during a run and reported once it is over.
///
/// A `gofmt` failure, for instance, does not stop the build (the compiler gives the
/// better message), but the user should still see what the formatter said.
#[derive(Debug, Default)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message, with `context` on its own line above the detail.
    pub fn defer(&mut self, context: impl fmt::Display, detail: impl fmt::Display) {
        let detail = detail.to_string();
        self.messages
            .push(format!("{}\n{}", context, detail.trim_end()));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Writes every recorded message, each behind a yellow `Warning:` prefix.
    pub fn flush_to(&mut self, out: &mut dyn Write) -> io::Result<()> {
        for message in self.messages.drain(..) {
            writeln!(out, "{} {}", "Warning:".yellow().bold(), message)?;
        }
        Ok(())
    }
}
