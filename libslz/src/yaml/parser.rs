//! Phase 2: YAML Parser
//!
//! Indentation-gated recursive descent. Each call receives the position of
//! its parent; a block member is only accepted when it sits deeper than that
//! parent, and siblings must share the indentation of the first one.
//!
//! Block mappings and sequences have no opening delimiter, so a node's slot
//! is reserved before its first token is inspected and typed afterwards.
//! Flow collections (`{...}`, `[...]`) are typed as soon as they open.

use crate::diagnostics::Diagnostics;
use crate::document::{Document, NodeIndex};
use crate::error::ParseError;
use crate::escape::copy_and_escape;
use crate::numbers::{classify, parse_float, parse_integer, NumberShape};
use crate::yaml::lexer::{ScalarStyle, Token, TokenType};
use crate::MAX_DEPTH;

/// Position of the parent a child is measured against.
///
/// The root has neither a line nor an indentation, which orders before any
/// real position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndentContext {
    line: Option<usize>,
    indentation: Option<usize>,
}

impl IndentContext {
    const ROOT: IndentContext = IndentContext {
        line: None,
        indentation: None,
    };

    fn of(token: &Token<'_>) -> IndentContext {
        IndentContext {
            line: Some(token.line),
            indentation: Some(token.indentation),
        }
    }
}

struct Parser<'t, 'a, 'd, 's> {
    tokens: &'t [Token<'a>],
    current: usize,
    diagnostics: &'d mut Diagnostics<'s>,
    document: Document,
    /// Token index of the last block-structure fault.
    misplaced: Option<usize>,
    /// Collections currently open, block or flow.
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
        misplaced: None,
        depth: 0,
        halted: false,
    };

    parser.parse_next(IndentContext::ROOT);

    if !parser.diagnostics.has_errors() {
        if let Some(token) = parser.peek() {
            let error = ParseError::TrailingContent(token.value.to_string());
            parser.diagnostics.report(token.offset, error);
        }
    }

    parser.document
}

/// Whether `token` can begin a value inside a flow collection.
fn starts_value(token: &Token<'_>) -> bool {
    matches!(
        token.typ,
        TokenType::Scalar | TokenType::Key | TokenType::BracketOpen | TokenType::BraceOpen
    )
}

impl<'t, 'a, 'd, 's> Parser<'t, 'a, 'd, 's> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) {
        self.current += 1;
    }

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

    /// Report a block-structure fault at the token under the cursor.
    ///
    /// Enclosing blocks meet the same misplaced token as they unwind; only
    /// the innermost one reports it.
    fn report_misplaced(&mut self, offset: usize, error: ParseError) {
        if self.misplaced == Some(self.current) {
            return;
        }
        self.misplaced = Some(self.current);
        self.report(offset, error);
    }

    /// A fresh node that stays null.
    fn null_node(&mut self) -> NodeIndex {
        let node = self.document.reserve();
        self.document.settle(node);
        node
    }

    /// Text of a key token, with escapes resolved for double-quoted keys.
    fn key_string(&mut self, token: &Token<'_>) -> String {
        match token.style {
            ScalarStyle::DoubleQuoted => copy_and_escape(&token.value, token.offset, self.diagnostics),
            _ => token.value.to_string(),
        }
    }

    /// Parse one value at the cursor, measured against `parent`.
    ///
    /// A block member that does not belong under `parent` leaves the slot
    /// null and the cursor untouched.
    fn parse_next(&mut self, parent: IndentContext) -> NodeIndex {
        let node = self.document.reserve();

        let Some(token) = self.peek() else {
            let offset = self.end_offset();
            self.report(offset, ParseError::OutOfTokens);
            self.document.settle(node);
            return node;
        };

        let opens_collection = matches!(
            token.typ,
            TokenType::Key | TokenType::Dash | TokenType::BraceOpen | TokenType::BracketOpen
        );
        if opens_collection && self.depth >= MAX_DEPTH {
            self.too_deep(token.offset);
            self.document.settle(node);
            return node;
        }

        self.depth += 1;
        match token.typ {
            TokenType::Scalar => {
                self.parse_scalar(node, token);
                self.advance();
            }
            TokenType::Key => self.parse_block_mapping(node, token, parent),
            TokenType::Dash => self.parse_block_sequence(node, token, parent),
            TokenType::BraceOpen => {
                self.document.begin_object(node);
                self.advance();
                self.parse_flow_mapping(node);
            }
            TokenType::BracketOpen => {
                self.document.begin_array(node);
                self.advance();
                self.parse_flow_sequence(node);
            }
            TokenType::BracketClose | TokenType::BraceClose | TokenType::Comma => {
                let found = token.value.to_string();
                self.report(token.offset, ParseError::ExpectedValue(found));
            }
        }
        self.depth -= 1;

        self.document.settle(node);
        node
    }

    fn parse_scalar(&mut self, node: NodeIndex, token: &Token<'_>) {
        let text = token.value.as_ref();

        match token.style {
            ScalarStyle::Plain => {}
            ScalarStyle::DoubleQuoted => {
                let value = copy_and_escape(text, token.offset, self.diagnostics);
                self.document.set_string(node, value);
                return;
            }
            ScalarStyle::SingleQuoted | ScalarStyle::Literal | ScalarStyle::Folded => {
                self.document.set_string(node, text.to_string());
                return;
            }
        }

        match text {
            "null" => return self.document.set_singleton(node, Document::NULL),
            "false" => return self.document.set_singleton(node, Document::FALSE),
            "true" => return self.document.set_singleton(node, Document::TRUE),
            _ => {}
        }

        match classify(text) {
            Some(NumberShape::Integer) => match parse_integer(text) {
                Ok(n) => self.document.set_integer(node, n),
                Err(e) => self.report(token.offset, e),
            },
            Some(NumberShape::Float) => match parse_float(text) {
                Ok(f) => self.document.set_float(node, f),
                Err(e) => self.report(token.offset, e),
            },
            None => self.document.set_string(node, text.to_string()),
        }
    }

    // ========================================================================
    // Block collections
    // ========================================================================

    fn parse_block_mapping(&mut self, node: NodeIndex, token: &'t Token<'a>, parent: IndentContext) {
        if Some(token.line) < parent.line {
            self.report_misplaced(token.offset, ParseError::MemberOnParentLine);
            return;
        }

        // Not deeper than the parent: belongs to an outer mapping
        if Some(token.indentation) <= parent.indentation {
            return;
        }

        self.document.begin_object(node);
        let indentation = token.indentation;

        while let Some(next) = self.peek() {
            if next.indentation < indentation {
                break;
            }

            if next.indentation != indentation {
                self.report_misplaced(next.offset, ParseError::IncorrectIndentation);
                break;
            }

            if next.typ != TokenType::Key {
                self.report_misplaced(next.offset, ParseError::ExpectedKey(next.value.to_string()));
                break;
            }

            let key = self.key_string(next);
            self.advance();

            match self.peek() {
                Some(value) if value.typ == TokenType::Key && value.line == next.line => {
                    self.report_misplaced(value.offset, ParseError::InlineNestedMapping);
                    let child = self.null_node();
                    self.document.insert_member(node, key, child);
                    break;
                }
                // Followed by a sibling key or the end: the value is null
                None => {
                    let child = self.null_node();
                    self.document.insert_member(node, key, child);
                }
                Some(value) if value.typ == TokenType::Key && value.indentation == indentation => {
                    let child = self.null_node();
                    self.document.insert_member(node, key, child);
                }
                Some(_) => {
                    let child = self.parse_next(IndentContext::of(next));
                    self.document.insert_member(node, key, child);
                }
            }
        }
    }

    fn parse_block_sequence(&mut self, node: NodeIndex, token: &'t Token<'a>, parent: IndentContext) {
        if Some(token.line) <= parent.line {
            self.report_misplaced(token.offset, ParseError::ItemOnParentLine);
            return;
        }

        if Some(token.indentation) < parent.indentation {
            return;
        }

        self.document.begin_array(node);
        let indentation = token.indentation;

        while let Some(next) = self.peek() {
            if next.indentation < indentation {
                break;
            }

            // A sequence written at its key's indentation ends at the next key
            if next.typ == TokenType::Key && Some(indentation) == parent.indentation {
                break;
            }

            if next.indentation != indentation {
                self.report_misplaced(next.offset, ParseError::IncorrectIndentation);
                break;
            }

            if next.typ != TokenType::Dash {
                self.report_misplaced(next.offset, ParseError::ExpectedListItem(next.value.to_string()));
                break;
            }

            self.advance();

            let item = match self.peek() {
                None => self.null_node(),
                Some(t) if t.typ == TokenType::Dash && t.indentation == indentation => self.null_node(),
                Some(_) => self.parse_next(IndentContext::of(next)),
            };
            self.document.push_item(node, item);
        }
    }

    // ========================================================================
    // Flow collections
    // ========================================================================

    /// Parse a flow value, stepping over the token if nothing could be made
    /// of it so the enclosing loop always progresses.
    fn parse_flow_value(&mut self, token: &'t Token<'a>) -> NodeIndex {
        let before = self.current;
        let reported = self.diagnostics.len();

        let value = self.parse_next(IndentContext::of(token));

        if self.current == before {
            if self.diagnostics.len() == reported {
                self.report(token.offset, ParseError::ExpectedValue(token.value.to_string()));
            }
            self.advance();
        }
        value
    }

    fn parse_flow_sequence(&mut self, node: NodeIndex) {
        loop {
            let next = match self.peek() {
                None => {
                    let offset = self.end_offset();
                    self.report(offset, ParseError::UnclosedArray);
                    return;
                }
                Some(t) if t.typ == TokenType::BracketClose => {
                    self.advance();
                    return;
                }
                Some(t) => t,
            };

            let item = self.parse_flow_value(next);
            self.document.push_item(node, item);

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
                    self.report(t.offset, ParseError::MissingArrayComma(t.value.to_string()));
                    if !starts_value(t) {
                        self.advance();
                    }
                }
            }
        }
    }

    fn parse_flow_mapping(&mut self, node: NodeIndex) {
        loop {
            let next = match self.peek() {
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

            if next.typ == TokenType::Key {
                let key = self.key_string(next);
                self.advance();

                let child = match self.peek() {
                    Some(t) if starts_value(t) => self.parse_flow_value(t),
                    // `{a:}` or `{a: , ...}`
                    _ => self.null_node(),
                };
                self.document.insert_member(node, key, child);
            } else {
                self.report(next.offset, ParseError::ExpectedKey(next.value.to_string()));
                self.advance();
            }

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
                    self.report(t.offset, ParseError::MissingObjectComma(t.value.to_string()));
                    if !starts_value(t) {
                        self.advance();
                    }
                }
            }
        }
    }
}
