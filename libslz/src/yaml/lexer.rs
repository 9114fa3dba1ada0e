//! Phase 1: YAML Lexer
//!
//! Converts source text into a token stream. Structure in YAML comes from
//! whitespace rather than delimiters, so every token records the indentation
//! and line it was found on. The lexer:
//! - Collects block scalars (`|` literal, `>` folded) into single tokens
//! - Emits flow punctuation (`[` `]` `{` `}` `,`) as single tokens
//! - Emits `Dash` for sequence markers and counts the dash as indentation
//! - Retags the scalar before a key colon as a `Key`
//!
//! Errors are reported and lexing continues.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::diagnostics::Diagnostics;
use crate::error::LexError;

/// Token type in the YAML lexer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Key,
    Scalar,
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    Comma,
    Dash,
}

impl TokenType {
    pub fn name(self) -> &'static str {
        match self {
            TokenType::Key => "KEY",
            TokenType::Scalar => "SCALAR",
            TokenType::BracketOpen => "BRACKET_OPEN",
            TokenType::BracketClose => "BRACKET_CLOSE",
            TokenType::BraceOpen => "BRACE_OPEN",
            TokenType::BraceClose => "BRACE_CLOSE",
            TokenType::Comma => "COMMA",
            TokenType::Dash => "DASH",
        }
    }

    fn punctuation(b: u8) -> Option<TokenType> {
        match b {
            b'[' => Some(TokenType::BracketOpen),
            b']' => Some(TokenType::BracketClose),
            b'{' => Some(TokenType::BraceOpen),
            b'}' => Some(TokenType::BraceClose),
            b',' => Some(TokenType::Comma),
            _ => None,
        }
    }
}

/// How a scalar was written. Decides how the parser interprets its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// A single token in the token stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub typ: TokenType,
    pub offset: usize,
    /// 0-based source line.
    pub line: usize,
    pub indentation: usize,
    pub value: Cow<'a, str>,
    pub style: ScalarStyle,
}

impl Token<'_> {
    /// Whether the scalar was written in any quoted or block form.
    pub fn is_quoted(&self) -> bool {
        self.style != ScalarStyle::Plain
    }
}

/// Scan position with the indentation and line measured so far.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    index: usize,
    indentation: usize,
    line: usize,
}

/// Trailing line break handling of a block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// One content line of a block scalar.
struct BlockLine<'a> {
    blanks_before: usize,
    extra_indentation: usize,
    text: &'a str,
}

fn is_white_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_flow_indicator(b: u8) -> bool {
    matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

/// Consume spaces, line breaks and (optionally) comments.
///
/// Spaces raise the indentation; a line break resets it and `\n` moves to the
/// next line. Tabs are reported and skipped without counting. Stops at the
/// first other character.
fn eat_spaces_and_get_indentation(
    bytes: &[u8],
    cursor: &mut Cursor,
    diagnostics: &mut Diagnostics<'_>,
    skip_comments: bool,
) {
    while cursor.index < bytes.len() {
        match bytes[cursor.index] {
            b'\t' => {
                diagnostics.report(cursor.index, LexError::TabNotAllowed);
                cursor.index += 1;
            }
            b'\r' | b'\n' => {
                cursor.indentation = 0;
                if bytes[cursor.index] == b'\n' {
                    cursor.line += 1;
                }
                cursor.index += 1;
            }
            b' ' => {
                cursor.indentation += 1;
                cursor.index += 1;
            }
            b'#' if skip_comments => {
                while cursor.index < bytes.len() && bytes[cursor.index] != b'\n' {
                    cursor.index += 1;
                }
            }
            _ => return,
        }
    }
}

struct Lexer<'a, 'd, 's> {
    content: &'a str,
    bytes: &'a [u8],
    cursor: Cursor,
    flow_depth: usize,
    force_key: bool,
    tokens: Vec<Token<'a>>,
    diagnostics: &'d mut Diagnostics<'s>,
}

/// Convert source text into tokens.
///
/// Returns the tokens found even when errors were reported.
pub fn tokenize<'a>(content: &'a str, diagnostics: &mut Diagnostics<'_>) -> Vec<Token<'a>> {
    let mut lexer = Lexer {
        content,
        bytes: content.as_bytes(),
        cursor: Cursor {
            index: 0,
            indentation: 0,
            line: 0,
        },
        flow_depth: 0,
        force_key: false,
        tokens: Vec::with_capacity((content.len() / 10).max(2)),
        diagnostics,
    };

    lexer.run();

    debug!(target: "libslz::yaml", "lexer output (token count: {})", lexer.tokens.len());
    for token in &lexer.tokens {
        trace!(
            target: "libslz::yaml",
            "  ({}, {}), type: {}, value: '{}'",
            token.indentation,
            token.line,
            token.typ.name(),
            token.value
        );
    }

    lexer.tokens
}

impl<'a> Lexer<'a, '_, '_> {
    fn run(&mut self) {
        while self.cursor.index < self.bytes.len() {
            eat_spaces_and_get_indentation(self.bytes, &mut self.cursor, self.diagnostics, true);
            self.lex_line();
        }
    }

    fn peek_at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Whether the byte after `index` ends an indicator (`-`, `?`, `:`).
    fn followed_by_space(&self, index: usize) -> bool {
        self.peek_at(index + 1).map_or(true, is_white_space)
    }

    /// Whether the `:` at `index` separates a key from its value.
    fn is_key_colon(&self, index: usize) -> bool {
        if self.followed_by_space(index) {
            return true;
        }
        if self.flow_depth == 0 {
            return false;
        }
        let next_is_indicator = self.peek_at(index + 1).is_some_and(is_flow_indicator);
        let after_quote = index > 0 && matches!(self.bytes[index - 1], b'"' | b'\'');
        next_is_indicator || after_quote
    }

    fn push(&mut self, typ: TokenType, offset: usize, value: Cow<'a, str>, style: ScalarStyle) {
        self.tokens.push(Token {
            typ,
            offset,
            line: self.cursor.line,
            indentation: self.cursor.indentation,
            value,
            style,
        });
    }

    fn scalar_type(&self) -> TokenType {
        if self.force_key {
            TokenType::Key
        } else {
            TokenType::Scalar
        }
    }

    /// Lex tokens until the end of the current line.
    fn lex_line(&mut self) {
        while let Some(b) = self.peek_at(self.cursor.index) {
            let i = self.cursor.index;

            if b == b'\n' {
                return;
            }

            if is_white_space(b) {
                self.cursor.index += 1;
                continue;
            }

            if let Some(typ) = TokenType::punctuation(b) {
                let content = self.content;
                match typ {
                    TokenType::BracketOpen | TokenType::BraceOpen => self.flow_depth += 1,
                    TokenType::BracketClose | TokenType::BraceClose => {
                        self.flow_depth = self.flow_depth.saturating_sub(1)
                    }
                    _ => {}
                }
                self.push(typ, i, Cow::Borrowed(&content[i..i + 1]), ScalarStyle::Plain);
                self.cursor.index += 1;
                continue;
            }

            match b {
                b'|' | b'>' => {
                    let style = if b == b'|' {
                        ScalarStyle::Literal
                    } else {
                        ScalarStyle::Folded
                    };
                    self.cursor.index += 1;
                    let (line, indentation) = (self.cursor.line, self.cursor.indentation);
                    let typ = self.scalar_type();
                    let value = self.collect_block_scalar(style);
                    self.tokens.push(Token {
                        typ,
                        offset: i + 1,
                        line,
                        indentation,
                        value: Cow::Owned(value),
                        style,
                    });
                }

                b'?' if self.followed_by_space(i) => {
                    self.force_key = true;
                    self.cursor.index += 1;
                }

                b'"' => self.lex_double_quoted(),

                b'\'' => self.lex_single_quoted(),

                // Comment only after whitespace or at the very start
                b'#' if i == 0 || is_white_space(self.bytes[i - 1]) => {
                    while self.peek_at(self.cursor.index).is_some_and(|c| c != b'\n') {
                        self.cursor.index += 1;
                    }
                }

                b'-' if self.followed_by_space(i) => {
                    self.push(TokenType::Dash, i, Cow::Borrowed("-"), ScalarStyle::Plain);
                    self.cursor.index += 1;
                    // Items align under the first character after the dash
                    self.cursor.indentation += 1;
                    eat_spaces_and_get_indentation(self.bytes, &mut self.cursor, self.diagnostics, true);
                }

                b':' if self.is_key_colon(i) => {
                    if let Some(last) = self.tokens.last_mut() {
                        if last.typ == TokenType::Scalar {
                            last.typ = TokenType::Key;
                        }
                    }
                    self.force_key = false;
                    self.cursor.index += 1;
                }

                _ => self.lex_plain(),
            }
        }
    }

    fn lex_double_quoted(&mut self) {
        let start = self.cursor.index + 1;
        let mut i = start;
        let mut closed = false;

        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' => {
                    closed = true;
                    break;
                }
                b'\n' => break,
                // The escaped character can't close the string or the line
                b'\\' if self.peek_at(i + 1).is_some_and(|c| c != b'\n') => i += 2,
                _ => i += 1,
            }
        }
        let end = i.min(self.bytes.len());
        self.report_unclosed(end, closed);

        let content = self.content;
        let typ = self.scalar_type();
        self.push(typ, start, Cow::Borrowed(&content[start..end]), ScalarStyle::DoubleQuoted);
        self.cursor.index = if closed { end + 1 } else { end };
    }

    fn lex_single_quoted(&mut self) {
        let start = self.cursor.index + 1;
        let mut i = start;
        let mut closed = false;
        let mut doubled = false;

        while i < self.bytes.len() {
            match self.bytes[i] {
                // '' is an escaped quote
                b'\'' if self.peek_at(i + 1) == Some(b'\'') => {
                    doubled = true;
                    i += 2;
                }
                b'\'' => {
                    closed = true;
                    break;
                }
                b'\n' => break,
                _ => i += 1,
            }
        }
        self.report_unclosed(i, closed);

        let content = self.content;
        let raw = &content[start..i];
        let value = if doubled {
            Cow::Owned(raw.replace("''", "'"))
        } else {
            Cow::Borrowed(raw)
        };
        let typ = self.scalar_type();
        self.push(typ, start, value, ScalarStyle::SingleQuoted);
        self.cursor.index = if closed { i + 1 } else { i };
    }

    fn report_unclosed(&mut self, end: usize, closed: bool) {
        if closed {
            return;
        }
        let offset = end.saturating_sub(1);
        if end >= self.bytes.len() {
            self.diagnostics.report(offset, LexError::UnterminatedString);
        } else {
            self.diagnostics.report(offset, LexError::NewlineInString);
        }
    }

    /// Unquoted scalar or key: everything up to the end of the line, a key
    /// colon, a comment, or (inside a flow collection) a flow indicator.
    fn lex_plain(&mut self) {
        let start = self.cursor.index;
        let mut end = start;
        let mut trimmed = start;

        while let Some(b) = self.peek_at(end) {
            if b == b'\n' {
                break;
            }
            if b == b':' && self.is_key_colon(end) {
                self.force_key = true;
                break;
            }
            if b == b'#' && end > start && is_white_space(self.bytes[end - 1]) {
                break;
            }
            if self.flow_depth > 0 && is_flow_indicator(b) {
                break;
            }
            end += 1;
            if !is_white_space(b) {
                trimmed = end;
            }
        }

        let content = self.content;
        if end == start {
            let width = content[start..].chars().next().map_or(1, char::len_utf8);
            end = start + width;
            trimmed = end;
        }

        let typ = self.scalar_type();
        self.push(typ, start, Cow::Borrowed(&content[start..trimmed]), ScalarStyle::Plain);
        self.cursor.index = end;
    }

    /// Collect a `|` or `>` block scalar. The cursor sits just after the
    /// indicator and ends on the first line that is not part of the block.
    fn collect_block_scalar(&mut self, style: ScalarStyle) -> String {
        let chomping = match self.peek_at(self.cursor.index) {
            Some(b'-') => Chomping::Strip,
            Some(b'+') => Chomping::Keep,
            _ => Chomping::Clip,
        };
        if chomping != Chomping::Clip {
            self.cursor.index += 1;
        }

        // A block directly after a dash nests under the dash, not the text
        // column the dash pushed the indentation to.
        let parent_indentation = match self.tokens.last() {
            Some(t) if t.typ == TokenType::Dash && t.line == self.cursor.line => t.indentation,
            _ => self.cursor.indentation,
        };
        let header_line = self.cursor.line;

        // Rest of the header line may only hold spaces and a comment
        let mut cursor = self.cursor;
        while self.peek_at(cursor.index).is_some_and(|b| b == b' ' || b == b'\t') {
            cursor.index += 1;
        }
        if self.peek_at(cursor.index) == Some(b'#') {
            while self.peek_at(cursor.index).is_some_and(|b| b != b'\n') {
                cursor.index += 1;
            }
        }
        if self.peek_at(cursor.index).is_some_and(|b| b != b'\n' && b != b'\r') {
            self.diagnostics.report(cursor.index, LexError::BlockNotOnNewLine);
            self.cursor.index = cursor.index;
            return String::new();
        }

        eat_spaces_and_get_indentation(self.bytes, &mut cursor, self.diagnostics, false);
        if cursor.index >= self.bytes.len() || cursor.indentation <= parent_indentation {
            self.diagnostics.report(cursor.index, LexError::BlockNotIndented);
            self.cursor = cursor;
            return String::new();
        }

        let content = self.content;
        let block_indentation = cursor.indentation;
        let mut lines = Vec::new();
        // A lone `\r` ends a line of text without advancing `line`
        let mut blanks_before = cursor.line.saturating_sub(header_line + 1);
        let trailing_breaks;

        loop {
            let start = cursor.index;
            while self.peek_at(cursor.index).is_some_and(|b| b != b'\n' && b != b'\r') {
                cursor.index += 1;
            }
            lines.push(BlockLine {
                blanks_before,
                extra_indentation: cursor.indentation - block_indentation,
                text: &content[start..cursor.index],
            });

            let last_line = cursor.line;
            eat_spaces_and_get_indentation(self.bytes, &mut cursor, self.diagnostics, false);
            if cursor.index >= self.bytes.len() || cursor.indentation < block_indentation {
                trailing_breaks = cursor.line.saturating_sub(last_line);
                break;
            }
            blanks_before = cursor.line.saturating_sub(last_line + 1);
        }

        self.cursor = cursor;

        let mut value = match style {
            ScalarStyle::Folded => fold_lines(&lines),
            _ => join_lines(&lines),
        };
        match chomping {
            Chomping::Strip => {}
            Chomping::Clip => value.push('\n'),
            Chomping::Keep => value.push_str(&"\n".repeat(trailing_breaks.max(1))),
        }
        value
    }
}

/// Literal join: every line break is kept.
fn join_lines(lines: &[BlockLine<'_>]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let breaks = if i == 0 {
            line.blanks_before
        } else {
            line.blanks_before + 1
        };
        out.push_str(&"\n".repeat(breaks));
        push_text(&mut out, line);
    }
    out
}

/// Folded join: a single break between two lines becomes a space, `k` blank
/// lines become `k` breaks, and lines indented past the block keep their
/// breaks.
fn fold_lines(lines: &[BlockLine<'_>]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push_str(&"\n".repeat(line.blanks_before));
        } else if line.extra_indentation > 0 || lines[i - 1].extra_indentation > 0 {
            out.push_str(&"\n".repeat(line.blanks_before + 1));
        } else if line.blanks_before > 0 {
            out.push_str(&"\n".repeat(line.blanks_before));
        } else {
            out.push(' ');
        }
        push_text(&mut out, line);
    }
    out
}

fn push_text(out: &mut String, line: &BlockLine<'_>) {
    out.push_str(&" ".repeat(line.extra_indentation));
    out.push_str(line.text);
}
