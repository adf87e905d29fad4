//! # Import Resolver
//!
//! Infers the import block of a Go fragment so one-liners can use packages without
//! declaring them. Every `identifier.` occurrence in the fragment is looked up in an
//! alias table: a built-in base layer of common packages, overlaid by the user layer
//! persisted in `<project>/imports.json`.
//!
//! The scan is deliberately loose. `x.Field` on a local variable matches as well; such
//! identifiers simply have no table entry and produce nothing, and anything genuinely
//! missing is reported by the Go compiler itself.

use crate::core::paths::ProjectContext;
use crate::system::executor::ExecutionError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::time::{Duration, SystemTime};
use thiserror::Error;

lazy_static! {
    // Any identifier immediately followed by a member-access dot: `pkg.Func`, `s.Field`, ...
    static ref QUALIFIER_RE: Regex = Regex::new(r"(\w+)\.").unwrap();
}

/// The built-in alias layer. Keys are what appears before the dot in code.
const BASE_IMPORTS: &[(&str, &str)] = &[
    ("atomic", "sync/atomic"),
    ("base64", "encoding/base64"),
    ("bufio", "bufio"),
    ("bytes", "bytes"),
    ("cmp", "cmp"),
    ("context", "context"),
    ("csv", "encoding/csv"),
    ("errors", "errors"),
    ("exec", "os/exec"),
    ("filepath", "path/filepath"),
    ("flag", "flag"),
    ("fmt", "fmt"),
    ("fp", "path/filepath"),
    ("fs", "io/fs"),
    ("hex", "encoding/hex"),
    ("http", "net/http"),
    ("io", "io"),
    ("json", "encoding/json"),
    ("log", "log"),
    ("maps", "maps"),
    ("math", "math"),
    ("md5", "crypto/md5"),
    ("net", "net"),
    ("os", "os"),
    ("path", "path"),
    ("rand", "math/rand"),
    ("re", "regexp"),
    ("regexp", "regexp"),
    ("runtime", "runtime"),
    ("script", "github.com/bitfield/script"),
    ("sha256", "crypto/sha256"),
    ("signal", "os/signal"),
    ("slices", "slices"),
    ("sort", "sort"),
    ("strconv", "strconv"),
    ("strings", "strings"),
    ("sync", "sync"),
    ("tabwriter", "text/tabwriter"),
    ("template", "text/template"),
    ("time", "time"),
    ("unicode", "unicode"),
    ("url", "net/url"),
    ("user", "os/user"),
    ("utf8", "unicode/utf8"),
];

/// Errors raised while reading, fetching or persisting import aliases.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Filesystem error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not a valid alias map: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unable to serialize the alias map: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to fetch package '{package}': {source}")]
    Fetch {
        package: String,
        #[source]
        source: ExecutionError,
    },
    #[error("'go mod tidy' failed: {0}")]
    Tidy(#[source] ExecutionError),
    #[error("'{0}' is not a package path.")]
    InvalidPackage(String),
}

/// The merged alias table used for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTable {
    entries: HashMap<String, String>,
}

impl Default for ImportTable {
    fn default() -> Self {
        Self::base()
    }
}

impl ImportTable {
    /// Only the built-in aliases.
    pub fn base() -> Self {
        let entries = BASE_IMPORTS
            .iter()
            .map(|(alias, path)| (alias.to_string(), path.to_string()))
            .collect();
        Self { entries }
    }

    /// Built-ins with `user` merged over them; user entries win on collision.
    pub fn with_overrides<I>(user: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = Self::base();
        table.entries.extend(user);
        table
    }

    /// Loads the table for a project.
    ///
    /// A missing `imports.json` is an empty user layer. An unreadable one is
    /// logged and ignored so that inference keeps working on the built-ins.
    pub fn load(ctx: &ProjectContext<'_>) -> Self {
        match read_user_imports(ctx) {
            Ok(user) => Self::with_overrides(user),
            Err(e) => {
                log::warn!("Ignoring user imports: {}", e);
                Self::base()
            }
        }
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }
}

/// Produces the import declarations a fragment needs, in first-reference order.
///
/// An alias that equals the last segment of its path is declared by path alone
/// (`"regexp"`); any other alias is declared explicitly (`re "regexp"`).
pub fn resolve_imports(fragment: &str, table: &ImportTable) -> Vec<String> {
    let mut declarations: Vec<String> = Vec::new();
    for caps in QUALIFIER_RE.captures_iter(fragment) {
        let Some(ident) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Some(path) = table.get(ident) else {
            continue;
        };

        let declaration = if package_basename(path) == ident {
            format!("\"{}\"", path)
        } else {
            format!("{} \"{}\"", ident, path)
        };

        if !declarations.contains(&declaration) {
            declarations.push(declaration);
        }
    }
    log::trace!("Resolved imports: {:?}", declarations);
    declarations
}

/// The last `/`-separated segment of an import path.
pub fn package_basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Reads `<project>/imports.json`. Missing file means no user aliases.
pub fn read_user_imports(
    ctx: &ProjectContext<'_>,
) -> Result<BTreeMap<String, String>, ImportError> {
    let path = ctx.user_imports_path();
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(&path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&content).map_err(|e| ImportError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Rewrites `<project>/imports.json` in full, pretty-printed with four-space indentation.
pub fn write_user_imports(
    ctx: &ProjectContext<'_>,
    imports: &BTreeMap<String, String>,
) -> Result<(), ImportError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    imports.serialize(&mut serializer)?;

    let path = ctx.user_imports_path();
    fs::write(&path, buffer).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Pulls an external package into the project and registers its alias.
///
/// `go mod tidy` runs first when `go.mod` has not changed for a week, so unnamed
/// shebang scripts don't pay for a tidy on every fetch. The alias is the last path
/// segment; any `@version` suffix is kept for `go get` only.
///
/// Returns the alias that was recorded.
pub fn fetch_package(ctx: &ProjectContext<'_>, package: &str) -> Result<String, ImportError> {
    let package = package.trim();
    let import_path = package.split('@').next().unwrap_or(package);
    let alias = package_basename(import_path);
    if import_path.is_empty() || alias.is_empty() {
        return Err(ImportError::InvalidPackage(package.to_string()));
    }

    // Read before touching anything: a corrupt alias file must not be clobbered.
    let mut user_imports = read_user_imports(ctx)?;

    if module_is_stale(ctx)? {
        log::info!("go.mod unchanged for a week, running 'go mod tidy' first.");
        tidy(ctx)?;
    }

    log::debug!("Fetching package '{}'", package);
    ctx.toolchain()
        .get(ctx.root(), package)
        .map_err(|e| ImportError::Fetch {
            package: package.to_string(),
            source: e,
        })?;

    user_imports.insert(alias.to_string(), import_path.to_string());
    write_user_imports(ctx, &user_imports)?;
    Ok(alias.to_string())
}

/// Runs `go mod tidy` in the project root.
pub fn tidy(ctx: &ProjectContext<'_>) -> Result<(), ImportError> {
    ctx.toolchain()
        .tidy(ctx.root())
        .map(|_| ())
        .map_err(ImportError::Tidy)
}

fn module_is_stale(ctx: &ProjectContext<'_>) -> Result<bool, ImportError> {
    let path = ctx.module_path();
    let modified = fs::metadata(&path)
        .and_then(|m| m.modified())
        .map_err(|e| ImportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    Ok(age > Duration::from_secs(crate::constants::TIDY_STALENESS_SECS))
}
