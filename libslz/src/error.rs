//! Error types for Slz parsing.

use crate::diagnostics::Diagnostic;
use thiserror::Error;

/// Result type for Slz parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }
}

/// Malformed token found while scanning source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Reached end of input inside a quoted string.
    #[error("String was not closed!")]
    UnterminatedString,

    /// Reached a line break inside a quoted string.
    #[error("Reached new line before closing string!")]
    NewlineInString,

    /// A `-` after the first character of a number.
    #[error("'-' sign can only be used at the start of a number!")]
    MisplacedMinus,

    /// A second `.` in a number.
    #[error("'.' can only be used once in a number!")]
    RepeatedDot,

    /// Character that cannot start any token.
    #[error("Encountered invalid token! (found token: {0})")]
    InvalidToken(char),

    /// Tab used where only spaces are allowed.
    #[error("Tabs are not allowed in yaml!")]
    TabNotAllowed,

    /// Block scalar content on the same line as its indicator.
    #[error("Block literal must start from a new line!")]
    BlockNotOnNewLine,

    /// Block scalar content not indented past its parent.
    #[error("Block literal must be indented more than the parent!")]
    BlockNotIndented,
}

/// Structural fault found while consuming tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but whitespace and comments.
    #[error("Document is empty!")]
    EmptyDocument,

    /// A value was required but the tokens ran out.
    #[error("Data is incomplete! (Parser ran out of tokens)")]
    OutOfTokens,

    /// Bare word other than `null`, `true` or `false`.
    #[error("Identifiers can only be true, false, or null! (found: '{0}')")]
    UnknownIdentifier(String),

    /// Missing `]`.
    #[error("Array was never closed with a ]!")]
    UnclosedArray,

    /// Missing `}`.
    #[error("Object was never closed with a }}!")]
    UnclosedObject,

    /// Array items without a comma between them.
    #[error("Array items must be separated by commas! (found: '{0}')")]
    MissingArrayComma(String),

    /// Object members without a comma between them.
    #[error("Object properties must be separated by commas! (found: '{0}')")]
    MissingObjectComma(String),

    /// Something other than a key where an object member must start.
    #[error("Expected a key for object! (found: '{0}')")]
    ExpectedKey(String),

    /// Key without a following colon.
    #[error("Expected : after key in object! (found: '{0}')")]
    ExpectedColon(String),

    /// Punctuation where a value must start.
    #[error("Expected a value (identifier, number, string, array, or object), found '{0}'")]
    ExpectedValue(String),

    /// Tokens left over after the root value.
    #[error("End of file expected! (found: '{0}')")]
    TrailingContent(String),

    /// Unsupported escape sequence in a quoted string.
    #[error("Unexpected escape character! (character: '\\{0}')")]
    BadEscape(char),

    /// Backslash with nothing after it.
    #[error("Unexpected end of string after '\\'!")]
    DanglingEscape,

    /// Numeric text that does not form a number.
    #[error("Malformed number literal! (found: '{0}')")]
    MalformedNumber(String),

    /// Numeric text that does not fit a 64-bit number.
    #[error("Number literal is out of range! (found: '{0}')")]
    NumberOutOfRange(String),

    /// Sibling indentation differs from the first sibling.
    #[error("Incorrect indentation!")]
    IncorrectIndentation,

    /// Something other than `-` where a sequence item must start.
    #[error("Expected a list item for array! (found: '{0}')")]
    ExpectedListItem(String),

    /// Mapping key placed before its parent.
    #[error("Object member can't start at the same line as the parent!")]
    MemberOnParentLine,

    /// Sequence dash on the same line as its parent.
    #[error("Array item can't start at the same line as the parent!")]
    ItemOnParentLine,

    /// `a: b: c` on one line.
    #[error("Nested mappings can't start on the same line as their key!")]
    InlineNestedMapping,

    /// Collections opened past the nesting limit.
    #[error("Collections are nested too deeply! (limit: {0})")]
    NestingTooDeep(usize),
}

/// Either kind of fault, as recorded in a diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Error type for Slz parsing.
///
/// Both variants carry every diagnostic reported during the attempt, in the
/// order they were found.
#[derive(Error, Debug)]
pub enum Error {
    /// The lexer rejected the source text; parsing was not attempted.
    #[error("{}", render(.0))]
    Lex(Vec<Diagnostic>),

    /// The token stream did not form a document.
    #[error("{}", render(.0))]
    Parse(Vec<Diagnostic>),
}

impl Error {
    /// The diagnostics that caused this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Lex(diagnostics) | Error::Parse(diagnostics) => diagnostics,
        }
    }
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
