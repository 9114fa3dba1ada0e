//! Phase 1: JSON Lexer
//!
//! Scans source text into a flat token sequence:
//! - Punctuation: `[` `]` `{` `}` `:` `,`
//! - `String`: the raw text between the quotes, escapes left unresolved
//! - `Integer` / `Float`: a numeric run, classified by the presence of `.`
//! - `Identifier`: a run of ASCII letters (`true`, `false`, `null`)
//!
//! Errors are reported and scanning continues from the best place found.

use tracing::{debug, trace};

use crate::diagnostics::Diagnostics;
use crate::error::LexError;

/// Token type in the JSON lexer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    Colon,
    Comma,
    String,
    Integer,
    Float,
    Identifier,
}

impl TokenType {
    fn punctuation(b: u8) -> Option<TokenType> {
        match b {
            b'[' => Some(TokenType::BracketOpen),
            b']' => Some(TokenType::BracketClose),
            b'{' => Some(TokenType::BraceOpen),
            b'}' => Some(TokenType::BraceClose),
            b':' => Some(TokenType::Colon),
            b',' => Some(TokenType::Comma),
            _ => None,
        }
    }
}

/// A single token, borrowing its text from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub typ: TokenType,
    /// Byte offset of the token text. For strings, the first byte after the
    /// opening quote.
    pub offset: usize,
    pub text: &'a str,
}

/// Convert source text into tokens.
///
/// Returns the tokens found even when errors were reported.
pub fn tokenize<'a>(content: &'a str, diagnostics: &mut Diagnostics<'_>) -> Vec<Token<'a>> {
    let bytes = content.as_bytes();
    let mut tokens = Vec::with_capacity((content.len() / 10).max(2));
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' | b'\0' => i += 1,

            b'"' => {
                i += 1;
                let end = scan_string(bytes, i, diagnostics);
                tokens.push(Token {
                    typ: TokenType::String,
                    offset: i,
                    text: &content[i..end],
                });
                // Skip the closing quote
                i = end + 1;
            }

            b'-' | b'0'..=b'9' => {
                let (end, typ) = scan_number(bytes, i, diagnostics);
                tokens.push(Token {
                    typ,
                    offset: i,
                    text: &content[i..end],
                });
                i = end;
            }

            b if b.is_ascii_alphabetic() => {
                let mut end = i + 1;
                while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
                    end += 1;
                }
                tokens.push(Token {
                    typ: TokenType::Identifier,
                    offset: i,
                    text: &content[i..end],
                });
                i = end;
            }

            b => match TokenType::punctuation(b) {
                Some(typ) => {
                    tokens.push(Token {
                        typ,
                        offset: i,
                        text: &content[i..i + 1],
                    });
                    i += 1;
                }
                None => {
                    let ch = content[i..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                    diagnostics.report(i, LexError::InvalidToken(ch));
                    i += ch.len_utf8();
                }
            },
        }
    }

    debug!(target: "libslz::json", "lexer output (token count: {})", tokens.len());
    for token in &tokens {
        trace!(target: "libslz::json", "    type: {:?}, value: '{}'", token.typ, token.text);
    }

    tokens
}

/// Find the end of a string body starting at `start`.
///
/// Returns the index of the closing quote, or of the best-effort end when
/// the string is cut off by a line break or the end of input.
fn scan_string(bytes: &[u8], start: usize, diagnostics: &mut Diagnostics<'_>) -> usize {
    let mut i = start;
    loop {
        if i >= bytes.len() {
            diagnostics.report(i.saturating_sub(1), LexError::UnterminatedString);
            return bytes.len();
        }
        match bytes[i] {
            b'"' => return i,
            b'\n' => {
                diagnostics.report(i.saturating_sub(1), LexError::NewlineInString);
                return i;
            }
            // The escaped character can't close the string or the line
            b'\\' if bytes.get(i + 1) != Some(&b'\n') => i += 2,
            _ => i += 1,
        }
    }
}

/// Find the end of a numeric run starting at `start` (a digit or `-`).
fn scan_number(bytes: &[u8], start: usize, diagnostics: &mut Diagnostics<'_>) -> (usize, TokenType) {
    let mut seen_dot = false;
    let mut i = start + 1;

    while i < bytes.len() {
        match bytes[i] {
            b'-' => {
                diagnostics.report(i, LexError::MisplacedMinus);
                break;
            }
            b'.' => {
                if seen_dot {
                    diagnostics.report(i, LexError::RepeatedDot);
                }
                seen_dot = true;
            }
            b'0'..=b'9' => {}
            _ => break,
        }
        i += 1;
    }

    let typ = if seen_dot {
        TokenType::Float
    } else {
        TokenType::Integer
    };
    (i, typ)
}
