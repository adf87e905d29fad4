//! # Source Assembler
//!
//! Turns a code fragment into a complete Go program: resolves its imports, renders
//! `script.tmpl` around it and runs `gofmt` over the result.

use crate::core::imports::{self, ImportTable};
use crate::core::paths::ProjectContext;
use crate::core::template::{Template, TemplateError};
use crate::models::{AssembledSource, TemplateData};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Unable to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid template '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: TemplateError,
    },
}

/// Reads a source file, dropping a leading `#!` interpreter line.
///
/// Line endings are normalized to `\n` and the result always ends with a newline.
pub fn read_source_file(path: &Path) -> Result<String, AssembleError> {
    let content = fs::read_to_string(path).map_err(|e| AssembleError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(strip_shebang(&content))
}

/// Removes the interpreter directive from the first line, if there is one.
pub fn strip_shebang(content: &str) -> String {
    let mut lines = content.lines().peekable();
    if lines.peek().is_some_and(|first| first.starts_with("#!")) {
        lines.next();
    }
    let mut out = String::with_capacity(content.len());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Returns the fragment to assemble.
///
/// When `code` names an existing file its contents are used instead; a real one-liner
/// is very unlikely to also be a path on disk.
pub fn load_fragment(code: &str) -> Result<String, AssembleError> {
    let candidate = Path::new(code);
    if !code.is_empty() && candidate.is_file() {
        log::debug!("Reading fragment from file '{}'", candidate.display());
        return read_source_file(candidate);
    }
    Ok(code.to_string())
}

/// Loads and parses `<project>/script.tmpl`.
pub fn load_template(ctx: &ProjectContext<'_>) -> Result<Template, AssembleError> {
    let path = ctx.template_path();
    let text = fs::read_to_string(&path).map_err(|e| AssembleError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    Template::parse(&text).map_err(|e| AssembleError::Template {
        path: path.display().to_string(),
        source: e,
    })
}

/// Builds the full program for `code` (inline text or a file path).
///
/// A formatting failure is not fatal: the unformatted rendering is returned together
/// with the formatter's message, and the compiler will point at the real problem.
pub fn assemble(ctx: &ProjectContext<'_>, code: &str) -> Result<AssembledSource, AssembleError> {
    let fragment = load_fragment(code)?;
    let table = ImportTable::load(ctx);
    let template = load_template(ctx)?;
    Ok(assemble_with(ctx, &template, &table, fragment))
}

/// Renders and formats an already loaded fragment.
pub fn assemble_with(
    ctx: &ProjectContext<'_>,
    template: &Template,
    table: &ImportTable,
    fragment: String,
) -> AssembledSource {
    let data = TemplateData {
        imports: imports::resolve_imports(&fragment, table),
        code: fragment,
    };
    let rendered = template.render(&data);

    match ctx.toolchain().format(&rendered) {
        Ok(formatted) => AssembledSource {
            source: formatted,
            format_error: None,
        },
        Err(e) => {
            log::debug!("gofmt rejected the rendered source: {}", e);
            AssembledSource {
                source: rendered,
                format_error: Some(e.output().map_or_else(|| e.to_string(), str::to_string)),
            }
        }
    }
}
