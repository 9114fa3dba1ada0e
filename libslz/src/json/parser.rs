//! Phase 2: JSON Parser
//!
//! Recursive descent over the token sequence with one token of lookahead.
//! Every value reserves its tree slot before its children, so nodes land in
//! pre-order.

use crate::diagnostics::Diagnostics;
use crate::document::{Document, NodeIndex};
use crate::error::ParseError;
use crate::escape::copy_and_escape;
use crate::json::lexer::{Token, TokenType};
use crate::numbers::{parse_float, parse_integer};
use crate::MAX_DEPTH;

struct Parser<'t, 'a, 'd, 's> {
    tokens: &'t [Token<'a>],
    current: usize,
    diagnostics: &'d mut Diagnostics<'s>,
    document: Document,
    /// Collections currently open.
    depth: usize,
    /// Set once nesting went too deep; nothing more is reported.
    halted: bool,
}

/// Parse a complete token sequence into a document.
///
/// The document is returned even when errors were reported; its shape is
/// only meaningful if `diagnostics` stayed empty.
pub fn parse_tokens(tokens: &[Token<'_>], diagnostics: &mut Diagnostics<'_>) -> Document {
    let document = Document::with_source_len(diagnostics.content().len());

    if tokens.is_empty() {
        diagnostics.report(0, ParseError::EmptyDocument);
        return document;
    }

    let mut parser = Parser {
        tokens,
        current: 0,
        diagnostics,
        document,
        depth: 0,
        halted: false,
    };

    parser.parse_next();

    if !parser.diagnostics.has_errors() {
        if let Some(token) = parser.peek() {
            let (offset, text) = (token.offset, token.text.to_string());
            parser
                .diagnostics
                .report(offset, ParseError::TrailingContent(text));
        }
    }

    parser.document
}

/// Whether `token` can begin a value.
///
/// Separator recovery leaves such a token in place instead of skipping it,
/// so one missing comma does not also swallow the value after it.
fn starts_value(token: &Token<'_>) -> bool {
    matches!(
        token.typ,
        TokenType::Identifier
            | TokenType::Integer
            | TokenType::Float
            | TokenType::String
            | TokenType::BracketOpen
            | TokenType::BraceOpen
    )
}

impl<'t, 'a, 'd, 's> Parser<'t, 'a, 'd, 's> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) {
        self.current += 1;
    }

    /// Offset of the last token, for faults found at the end of input.
    fn end_offset(&self) -> usize {
        self.tokens.last().map(|t| t.offset).unwrap_or(0)
    }

    fn report(&mut self, offset: usize, error: ParseError) {
        if !self.halted {
            self.diagnostics.report(offset, error);
        }
    }

    /// Stop at a collection nested past `MAX_DEPTH`, skipping the rest of
    /// the input.
    fn too_deep(&mut self, offset: usize) {
        self.report(offset, ParseError::NestingTooDeep(MAX_DEPTH));
        self.halted = true;
        self.current = self.tokens.len();
    }

    /// Parse one value starting at the cursor and return its tree index.
    ///
    /// Punctuation in value position is reported but not consumed; the
    /// enclosing collection decides how to step over it.
    fn parse_next(&mut self) -> NodeIndex {
        let node = self.document.reserve();

        let Some(token) = self.peek() else {
            let offset = self.end_offset();
            self.report(offset, ParseError::OutOfTokens);
            self.document.settle(node);
            return node;
        };

        match token.typ {
            TokenType::String => {
                let value = copy_and_escape(token.text, token.offset, self.diagnostics);
                self.document.set_string(node, value);
                self.advance();
            }

            TokenType::Integer => {
                match parse_integer(token.text) {
                    Ok(n) => self.document.set_integer(node, n),
                    Err(e) => self.report(token.offset, e),
                }
                self.advance();
            }

            TokenType::Float => {
                match parse_float(token.text) {
                    Ok(f) => self.document.set_float(node, f),
                    Err(e) => self.report(token.offset, e),
                }
                self.advance();
            }

            TokenType::Identifier => {
                match token.text {
                    "null" => self.document.set_singleton(node, Document::NULL),
                    "false" => self.document.set_singleton(node, Document::FALSE),
                    "true" => self.document.set_singleton(node, Document::TRUE),
                    other => {
                        let found = other.to_string();
                        self.report(token.offset, ParseError::UnknownIdentifier(found));
                    }
                }
                self.advance();
            }

            TokenType::BracketOpen | TokenType::BraceOpen if self.depth >= MAX_DEPTH => {
                self.too_deep(token.offset);
            }

            TokenType::BracketOpen => {
                self.document.begin_array(node);
                self.advance();
                self.depth += 1;
                self.parse_array_items(node);
                self.depth -= 1;
            }

            TokenType::BraceOpen => {
                self.document.begin_object(node);
                self.advance();
                self.depth += 1;
                self.parse_object_members(node);
                self.depth -= 1;
            }

            TokenType::BracketClose | TokenType::BraceClose | TokenType::Colon | TokenType::Comma => {
                let found = token.text.to_string();
                self.report(token.offset, ParseError::ExpectedValue(found));
            }
        }

        self.document.settle(node);
        node
    }

    fn parse_array_items(&mut self, array: NodeIndex) {
        loop {
            match self.peek() {
                None => {
                    let offset = self.end_offset();
                    self.report(offset, ParseError::UnclosedArray);
                    return;
                }
                Some(t) if t.typ == TokenType::BracketClose => {
                    self.advance();
                    return;
                }
                Some(_) => {}
            }

            let item = self.parse_next();
            self.document.push_item(array, item);

            match self.peek() {
                None => {
                    let offset = self.end_offset();
                    self.report(offset, ParseError::UnclosedArray);
                    return;
                }
                Some(t) if t.typ == TokenType::BracketClose => {
                    self.advance();
                    return;
                }
                Some(t) if t.typ == TokenType::Comma => self.advance(),
                Some(t) => {
                    self.report(t.offset, ParseError::MissingArrayComma(t.text.to_string()));
                    if !starts_value(t) {
                        self.advance();
                    }
                }
            }
        }
    }

    fn parse_object_members(&mut self, object: NodeIndex) {
        loop {
            let key = match self.peek() {
                None => {
                    let offset = self.end_offset();
                    self.report(offset, ParseError::UnclosedObject);
                    return;
                }
                Some(t) if t.typ == TokenType::BraceClose => {
                    self.advance();
                    return;
                }
                Some(t) => t,
            };

            if key.typ != TokenType::String {
                self.report(key.offset, ParseError::ExpectedKey(key.text.to_string()));
            }
            let key_string = copy_and_escape(key.text, key.offset, self.diagnostics);
            self.advance();

            match self.peek() {
                Some(t) if t.typ == TokenType::Colon => self.advance(),
                Some(t) => {
                    self.report(t.offset, ParseError::ExpectedColon(t.text.to_string()));
                    if !starts_value(t) && t.typ != TokenType::BraceClose {
                        self.advance();
                    }
                }
                None => {}
            }

            let value = self.parse_next();
            self.document.insert_member(object, key_string, value);

            match self.peek() {
                None => {
                    let offset = self.end_offset();
                    self.report(offset, ParseError::UnclosedObject);
                    return;
                }
                Some(t) if t.typ == TokenType::BraceClose => {
                    self.advance();
                    return;
                }
                Some(t) if t.typ == TokenType::Comma => self.advance(),
                Some(t) => {
                    self.report(t.offset, ParseError::MissingObjectComma(t.text.to_string()));
                    if !starts_value(t) {
                        self.advance();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DependencyNode, NodeType, Resource};
    use crate::error::ParseContext;
    use crate::json::lexer::tokenize;
    use crate::Syntax;
    use pretty_assertions::assert_eq;

    fn run(content: &str) -> (Document, Vec<String>) {
        let ctx = ParseContext::default();
        let mut diagnostics = Diagnostics::new(content, Syntax::Json, &ctx);
        let tokens = tokenize(content, &mut diagnostics);
        assert!(diagnostics.is_empty(), "unexpected lex errors");
        let document = parse_tokens(&tokens, &mut diagnostics);
        let errors = diagnostics.iter().map(|d| d.to_string()).collect();
        (document, errors)
    }

    #[test]
    fn test_null_root() {
        let (doc, errors) = run("null");
        assert!(errors.is_empty());
        assert_eq!(doc.dependency_tree().len(), 4);
        assert_eq!(doc.node(Document::ROOT), Some(&DependencyNode::None(0)));
    }

    #[test]
    fn test_singletons_in_array() {
        let (doc, errors) = run("[true, false, null]");
        assert!(errors.is_empty());
        assert_eq!(doc.node(Document::ROOT), Some(&DependencyNode::Array(vec![4, 5, 6])));
        assert_eq!(doc.node(4), Some(&DependencyNode::Boolean(2)));
        assert_eq!(doc.node(5), Some(&DependencyNode::Boolean(1)));
        assert_eq!(doc.node(6), Some(&DependencyNode::None(0)));
        assert_eq!(doc.resources().len(), 3);
    }

    #[test]
    fn test_object_with_nested_array() {
        let (doc, errors) = run(r#"{"a": 1, "b": [2,3]}"#);
        assert!(errors.is_empty());
        let root = doc.root();
        assert_eq!(root.node_type(), NodeType::Object);
        assert_eq!(root.get("a").as_i64(), Some(1));
        assert_eq!(root.get("b").node_type(), NodeType::Array);
        assert_eq!(root.get("b").at(0).as_i64(), Some(2));
        assert_eq!(root.get("b").at(1).as_i64(), Some(3));
        assert_eq!(
            &doc.resources()[3..],
            &[Resource::Integer(1), Resource::Integer(2), Resource::Integer(3)]
        );
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let (doc, errors) = run(r#"{"a": 1, "a": 2}"#);
        assert!(errors.is_empty());
        assert_eq!(doc.root().len(), 1);
        assert_eq!(doc.root().get("a").as_i64(), Some(2));
    }

    #[test]
    fn test_escaped_key_and_value() {
        let (doc, errors) = run(r#"{"tab\tkey": "line\nbreak"}"#);
        assert!(errors.is_empty());
        assert_eq!(doc.root().get("tab\tkey").as_str(), Some("line\nbreak"));
    }

    #[test]
    fn test_missing_value() {
        let (_, errors) = run(r#"{"a": }"#);
        assert_eq!(
            errors,
            vec!["Json Error[1, 7]: Expected a value (identifier, number, string, array, or object), found '}'"]
        );
    }

    #[test]
    fn test_missing_comma_keeps_next_value() {
        let (doc, errors) = run("[1 2, 3]");
        assert_eq!(
            errors,
            vec!["Json Error[1, 4]: Array items must be separated by commas! (found: '2')"]
        );
        assert_eq!(doc.root().len(), 3);
        assert_eq!(doc.root().at(1).as_i64(), Some(2));
    }

    #[test]
    fn test_several_faults_in_one_pass() {
        let (_, errors) = run(r#"{"a" 1, "b": nope, 3: 4}"#);
        assert_eq!(
            errors,
            vec![
                "Json Error[1, 6]: Expected : after key in object! (found: '1')",
                "Json Error[1, 14]: Identifiers can only be true, false, or null! (found: 'nope')",
                "Json Error[1, 20]: Expected a key for object! (found: '3')",
            ]
        );
    }

    #[test]
    fn test_unclosed_collections() {
        let (_, errors) = run("[1, [2");
        assert_eq!(
            errors,
            vec![
                "Json Error[1, 6]: Array was never closed with a ]!",
                "Json Error[1, 6]: Array was never closed with a ]!",
            ]
        );

        let (_, errors) = run(r#"{"a": 1"#);
        assert_eq!(errors, vec!["Json Error[1, 7]: Object was never closed with a }!"]);
    }

    #[test]
    fn test_trailing_content() {
        let (_, errors) = run("[1] 2");
        assert_eq!(errors, vec!["Json Error[1, 5]: End of file expected! (found: '2')"]);
    }

    #[test]
    fn test_out_of_tokens() {
        let (_, errors) = run(r#"{"a":"#);
        assert_eq!(
            errors,
            vec![
                "Json Error[1, 5]: Data is incomplete! (Parser ran out of tokens)",
                "Json Error[1, 5]: Object was never closed with a }!",
            ]
        );
    }

    #[test]
    fn test_number_conversion_is_strict() {
        let (_, errors) = run("[-, 99999999999999999999]");
        assert_eq!(
            errors,
            vec![
                "Json Error[1, 2]: Malformed number literal! (found: '-')",
                "Json Error[1, 5]: Number literal is out of range! (found: '99999999999999999999')",
            ]
        );
    }

    #[test]
    fn test_nesting_limit() {
        let (_, errors) = run(&"[".repeat(100_000));
        assert_eq!(
            errors,
            vec!["Json Error[1, 129]: Collections are nested too deeply! (limit: 128)"]
        );

        let (_, errors) = run(&r#"{"a":"#.repeat(500));
        assert_eq!(errors.len(), 1);

        let fits = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        let (document, errors) = run(&fits);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(document.dependency_tree().len(), Document::ROOT + MAX_DEPTH);
    }

    #[test]
    fn test_stray_closer_terminates() {
        let (_, errors) = run("[:]");
        assert_eq!(
            errors,
            vec![
                "Json Error[1, 2]: Expected a value (identifier, number, string, array, or object), found ':'",
                "Json Error[1, 2]: Array items must be separated by commas! (found: ':')",
            ]
        );
    }
}
