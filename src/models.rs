// src/models.rs

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::TEMPORARY_NAME_PREFIX;

// --- COMMAND MODELS ---

/// Lifecycle state of a command as seen from its source file in `<project>/src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    /// `<name>.go` exists; the command is compiled into `bin/<name>`.
    Active,
    /// The `.go` extension was stripped by delete/export. Needs `--restore`.
    SoftDeleted,
}

/// One entry of the command listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Command name, without the source extension for active commands.
    pub name: String,
    pub state: CommandState,
}

impl fmt::Display for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            CommandState::Active => write!(f, "{}", self.name),
            CommandState::SoftDeleted => write!(f, "{} {}", self.name, t!("list.requires_restore")),
        }
    }
}

/// The name a build is stored under, and whether it belongs to the user.
///
/// Temporary names are generated per invocation and never outlive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandName {
    pub name: String,
    pub temporary: bool,
}

impl CommandName {
    /// A user supplied, persistent name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temporary: false,
        }
    }

    /// A generated `gocmd-<nanos>` name.
    pub fn temporary() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self {
            name: format!("{}{}", TEMPORARY_NAME_PREFIX, nanos),
            temporary: true,
        }
    }
}

// --- ASSEMBLY MODELS ---

/// The values a `script.tmpl` template can reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    /// Formatted import declarations, e.g. `"regexp"` or `re "regexp"`.
    pub imports: Vec<String>,
    /// The code fragment, inserted verbatim.
    pub code: String,
}

/// A rendered source unit ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSource {
    pub source: String,
    /// Set when `gofmt` rejected the rendering. Reported at the end of the run.
    pub format_error: Option<String>,
}
