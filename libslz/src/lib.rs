//! SLZ document parsing: JSON and YAML front ends over one flat document.
//!
//! Both grammars compile into the same [`Document`], an arena of nodes
//! addressed by index plus a table of scalar resources. Nothing downstream
//! needs to know which grammar produced a document.
//!
//! # Parsing Pipeline
//!
//! Each front end runs in two phases:
//!
//! 1. **Lexer**: Converts source text into a flat token sequence. The YAML
//!    lexer also records the indentation and line of every token, collects
//!    block scalars and retags scalars as keys when it meets a key colon.
//!
//! 2. **Parser**: Recursive descent over the tokens, reserving tree slots and
//!    filling them as content is recognized.
//!
//! Both phases are best-effort. Every fault becomes a [`Diagnostic`] (and an
//! `ERROR` event through `tracing`) and work continues, so one call surfaces
//! as many problems as it can. A lexing failure stops the pipeline before
//! the parser runs.

mod diagnostics;
mod document;
mod encode;
mod error;
mod escape;
pub mod json;
mod numbers;
mod value;
pub mod yaml;

use std::fmt;
use std::path::Path;

pub use diagnostics::{line_and_column, Diagnostic};
pub use document::{DependencyNode, Document, NodeIndex, NodeType, ObjectNode, Resource, ResourceIndex};
pub use encode::{encode, json_float, json_string, Format};
pub use error::{DiagnosticKind, Error, LexError, ParseContext, ParseError, Result};
pub use value::Value;

/// Deepest collection nesting either front end accepts.
///
/// A collection opened past this depth is reported and ends the parse.
pub const MAX_DEPTH: usize = 128;

/// Surface grammar of a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Json,
    Yaml,
}

impl Syntax {
    /// Infer the grammar from a file extension (`json`, `yaml` or `yml`).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Syntax> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Syntax::Json),
            "yaml" | "yml" => Some(Syntax::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Json => f.write_str("Json"),
            Syntax::Yaml => f.write_str("Yaml"),
        }
    }
}

/// Parse a document from a string.
///
/// # Example
///
/// ```
/// use libslz::{parse, Syntax};
///
/// let doc = parse(r#"{"size": 32}"#, Syntax::Json).unwrap();
/// assert_eq!(doc.root().get("size").as_i64(), Some(32));
/// ```
pub fn parse(input: &str, syntax: Syntax) -> Result<Document> {
    parse_with_filename(input, syntax, None)
}

/// Parse a document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, syntax: Syntax, filename: Option<&str>) -> Result<Document> {
    let ctx = ParseContext::new(filename);
    match syntax {
        Syntax::Json => json::parse(input, &ctx),
        Syntax::Yaml => yaml::parse(input, &ctx),
    }
}

/// Parse JSON text.
pub fn parse_json(input: &str) -> Result<Document> {
    parse(input, Syntax::Json)
}

/// Parse YAML text.
pub fn parse_yaml(input: &str) -> Result<Document> {
    parse(input, Syntax::Yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_from_path() {
        assert_eq!(Syntax::from_path("fonts/mono.json"), Some(Syntax::Json));
        assert_eq!(Syntax::from_path("sheet.YAML"), Some(Syntax::Yaml));
        assert_eq!(Syntax::from_path("sheet.yml"), Some(Syntax::Yaml));
        assert_eq!(Syntax::from_path("sheet.toml"), None);
        assert_eq!(Syntax::from_path("Makefile"), None);
    }

    #[test]
    fn test_both_grammars_agree() {
        let from_json = parse_json(r#"{"a": [1, 2.5, "x"], "b": null}"#).unwrap();
        let from_yaml = parse_yaml("a: [1, 2.5, x]\nb: null\n").unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.root(), from_yaml.root());
    }

    #[test]
    fn test_filename_in_error() {
        let err = parse_with_filename("[1,", Syntax::Json, Some("atlas.json")).unwrap_err();
        assert!(err.to_string().ends_with(" of <atlas.json>"));
    }
}
