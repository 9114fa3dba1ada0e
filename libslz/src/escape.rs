//! Escape resolution for quoted strings, shared by both grammars.

use crate::diagnostics::Diagnostics;
use crate::error::ParseError;

/// Resolve backslash escapes in the raw text of a quoted token.
///
/// Recognized: `\b \f \n \r \t \" \\`. Anything else is reported at
/// `offset` (the token's position) and copied through unchanged so the rest
/// of the string survives.
pub fn copy_and_escape(raw: &str, offset: usize, diagnostics: &mut Diagnostics<'_>) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                diagnostics.report(offset, ParseError::BadEscape(other));
                result.push('\\');
                result.push(other);
            }
            None => {
                diagnostics.report(offset, ParseError::DanglingEscape);
                result.push('\\');
            }
        }
    }

    result
}
