//! JSON front end.

pub mod lexer;
pub mod parser;

use tracing::{debug, enabled, trace, Level};

use crate::diagnostics::Diagnostics;
use crate::document::Document;
use crate::encode::{encode, Format};
use crate::error::{Error, ParseContext, Result};
use crate::Syntax;

/// Lex and parse JSON text.
pub fn parse(input: &str, ctx: &ParseContext) -> Result<Document> {
    let mut diagnostics = Diagnostics::new(input, Syntax::Json, ctx);

    let tokens = lexer::tokenize(input, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Lex(diagnostics.into_vec()));
    }

    let document = parser::parse_tokens(&tokens, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Parse(diagnostics.into_vec()));
    }

    debug!(target: "libslz::json", "parser output (tree size: {})", document.dependency_tree().len());
    if enabled!(target: "libslz::json", Level::TRACE) {
        trace!(target: "libslz::json", "\n{}", encode(&document, Format::Tree));
    }

    Ok(document)
}
