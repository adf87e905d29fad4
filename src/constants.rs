// src/constants.rs

/// Name used when the invoked program name is unavailable.
pub const APP_NAME: &str = "goscript";

/// Environment variable that overrides the project directory.
pub const PROJECT_DIR_ENV: &str = "GOSCRIPT_PROJECT_DIR";

/// Preferred editor for `--edit`. Falls back to `EDITOR_ENV`.
pub const EDITOR_OVERRIDE_ENV: &str = "GOSCRIPT_EDITOR";

pub const EDITOR_ENV: &str = "EDITOR";

/// Directory (inside the project) holding one source file per command.
pub const SRC_DIR: &str = "src";

/// Directory (inside the project) holding one executable per active command.
pub const BIN_DIR: &str = "bin";

/// The render template for code fragments.
pub const TEMPLATE_FILENAME: &str = "script.tmpl";

/// The user layer of the import alias table.
pub const USER_IMPORTS_FILENAME: &str = "imports.json";

/// The Go module descriptor. Its mtime drives the periodic `go mod tidy`.
pub const MODULE_FILENAME: &str = "go.mod";

/// Extension of an active command's source file. A source without it is soft-deleted.
pub const SOURCE_EXTENSION: &str = "go";

/// Prefix for generated names of temporary commands.
pub const TEMPORARY_NAME_PREFIX: &str = "gocmd-";

/// `go mod tidy` runs before a fetch when `go.mod` is older than this.
pub const TIDY_STALENESS_SECS: u64 = 7 * 24 * 60 * 60;

/// The package every new project starts with.
pub const DEFAULT_PACKAGE: &str = "github.com/bitfield/script";

/// Contents of `script.tmpl` written by `--setup`.
pub const DEFAULT_TEMPLATE: &str =
    "package main\n\nimport ( {{range .Imports}}\n\t{{.}}{{ end }}\n)\n\nfunc main() {\n\t{{.Code}}\n}\n";
