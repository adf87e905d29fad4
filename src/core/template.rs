//! # Template
//!
//! Renders `script.tmpl`, the file that turns a code fragment into a complete Go program.
//! The file is user editable and uses Go `text/template` syntax, so the subset that a
//! program wrapper needs is understood here:
//!
//! - `{{.Code}}`: the fragment, verbatim.
//! - `{{range .Imports}} ... {{.}} ... {{end}}`: repeated once per import declaration.
//! - `{{/* comment */}}`: dropped.
//! - `{{- ` and ` -}}`: trim the whitespace before / after the action.

use crate::models::TemplateData;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    // `{{`, optional left trim marker, the action, optional right trim marker, `}}`.
    static ref ACTION_RE: Regex = Regex::new(r"(?s)\{\{(- )?(.*?)( -)?\}\}").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unsupported template action '{{{{{action}}}}}' at byte {offset}.")]
    UnknownAction { action: String, offset: usize },
    #[error("'{{{{end}}}}' at byte {offset} has no matching '{{{{range}}}}'.")]
    UnexpectedEnd { offset: usize },
    #[error("'{{{{range .Imports}}}}' is never closed with '{{{{end}}}}'.")]
    UnclosedRange,
    #[error("'{{{{range}}}}' blocks cannot be nested (byte {offset}).")]
    NestedRange { offset: usize },
    #[error("'{{{{.}}}}' is only valid inside '{{{{range .Imports}}}}' (byte {offset}).")]
    DotOutsideRange { offset: usize },
}

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Code,
    /// The current import inside a range.
    Dot,
    RangeImports(Vec<Node>),
}

impl Template {
    /// Parses template text.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        // The innermost open block is the last element; the root is always present.
        let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
        let mut last_end = 0;
        let mut trim_next_text = false;

        for caps in ACTION_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let offset = whole.start();

            let mut literal = &text[last_end..offset];
            if trim_next_text {
                literal = literal.trim_start();
            }
            if caps.get(1).is_some() {
                literal = literal.trim_end();
            }
            push_text(current(&mut stack), literal);
            trim_next_text = caps.get(3).is_some();
            last_end = whole.end();

            let action = caps.get(2).map_or("", |m| m.as_str()).trim();
            match action {
                ".Code" => current(&mut stack).push(Node::Code),
                "." => {
                    if stack.len() < 2 {
                        return Err(TemplateError::DotOutsideRange { offset });
                    }
                    current(&mut stack).push(Node::Dot);
                }
                "range .Imports" => {
                    if stack.len() > 1 {
                        return Err(TemplateError::NestedRange { offset });
                    }
                    stack.push(Vec::new());
                }
                "end" => {
                    if stack.len() < 2 {
                        return Err(TemplateError::UnexpectedEnd { offset });
                    }
                    let body = stack.pop().unwrap_or_default();
                    current(&mut stack).push(Node::RangeImports(body));
                }
                a if a.starts_with("/*") && a.ends_with("*/") => {}
                other => {
                    return Err(TemplateError::UnknownAction {
                        action: other.to_string(),
                        offset,
                    });
                }
            }
        }

        if stack.len() > 1 {
            return Err(TemplateError::UnclosedRange);
        }

        let mut tail = &text[last_end..];
        if trim_next_text {
            tail = tail.trim_start();
        }
        push_text(current(&mut stack), tail);

        Ok(Self {
            nodes: stack.pop().unwrap_or_default(),
        })
    }

    /// Renders the template. Rendering is pure: same data, same output.
    pub fn render(&self, data: &TemplateData) -> String {
        let mut out = String::with_capacity(data.code.len() + 256);
        render_nodes(&self.nodes, data, None, &mut out);
        out
    }
}

fn current(stack: &mut Vec<Vec<Node>>) -> &mut Vec<Node> {
    if stack.is_empty() {
        stack.push(Vec::new());
    }
    let last = stack.len() - 1;
    &mut stack[last]
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn render_nodes(nodes: &[Node], data: &TemplateData, dot: Option<&str>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Code => out.push_str(&data.code),
            Node::Dot => out.push_str(dot.unwrap_or_default()),
            Node::RangeImports(body) => {
                for import in &data.imports {
                    render_nodes(body, data, Some(import), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_TEMPLATE;

    fn data(imports: &[&str], code: &str) -> TemplateData {
        TemplateData {
            imports: imports.iter().map(|s| s.to_string()).collect(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_default_template_renders_imports_and_code() {
        let template = Template::parse(DEFAULT_TEMPLATE).unwrap();
        let out = template.render(&data(
            &[r#""fmt""#, r#"re "regexp""#],
            r#"fmt.Println(re.QuoteMeta("a.b"))"#,
        ));
        assert_eq!(
            out,
            "package main\n\nimport ( \n\t\"fmt\"\n\tre \"regexp\"\n)\n\nfunc main() {\n\tfmt.Println(re.QuoteMeta(\"a.b\"))\n}\n"
        );
    }

    #[test]
    fn test_default_template_without_imports() {
        let template = Template::parse(DEFAULT_TEMPLATE).unwrap();
        let out = template.render(&data(&[], "println(1)"));
        assert_eq!(
            out,
            "package main\n\nimport ( \n)\n\nfunc main() {\n\tprintln(1)\n}\n"
        );
    }

    #[test]
    fn test_code_is_inserted_verbatim() {
        let template = Template::parse("{{.Code}}").unwrap();
        let code = "x := `{{.Code}}`\nfmt.Println(x)";
        assert_eq!(template.render(&data(&[], code)), code);
    }

    #[test]
    fn test_trim_markers_and_comments() {
        let template =
            Template::parse("a  {{- /* note */ -}}  b\n{{- range .Imports }}[{{.}}]{{end}}")
                .unwrap();
        assert_eq!(template.render(&data(&["x", "y"], "")), "ab[x][y]");
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = Template::parse("{{.Name}}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownAction {
                action: ".Name".to_string(),
                offset: 0
            }
        );
    }

    #[test]
    fn test_unbalanced_blocks_are_rejected() {
        assert_eq!(
            Template::parse("{{range .Imports}}{{.}}").unwrap_err(),
            TemplateError::UnclosedRange
        );
        assert_eq!(
            Template::parse("x{{end}}").unwrap_err(),
            TemplateError::UnexpectedEnd { offset: 1 }
        );
        assert_eq!(
            Template::parse("{{.}}").unwrap_err(),
            TemplateError::DotOutsideRange { offset: 0 }
        );
        assert!(matches!(
            Template::parse("{{range .Imports}}{{range .Imports}}{{end}}{{end}}"),
            Err(TemplateError::NestedRange { .. })
        ));
    }
}
