//! Source positions and the error sink shared by both front ends.
//!
//! Faults are never fatal here: a lexer or parser reports what it found,
//! picks a recovery action, and keeps going. The sink remembers every report
//! so the caller can decide what a failed parse means for it.

use std::fmt;

use crate::error::{DiagnosticKind, ParseContext};
use crate::Syntax;

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// Offsets past the end are clamped to the end of the content.
pub fn line_and_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let mut line = 1;
    let mut column = offset + 1;

    for (i, b) in content.as_bytes()[..offset].iter().enumerate() {
        if *b == b'\n' {
            line += 1;
            column = offset - i;
        }
    }

    (line, column)
}

/// A single reported fault with its resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub syntax: Syntax,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub kind: DiagnosticKind,
    pub filename: Option<String>,
}

impl Diagnostic {
    /// Whether the lexer (rather than the parser) reported this fault.
    pub fn is_lex_error(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Lex(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Error[{}, {}]: {}",
            self.syntax, self.line, self.column, self.kind
        )?;
        if let Some(name) = &self.filename {
            write!(f, " of <{}>", name)?;
        }
        Ok(())
    }
}

/// Collects diagnostics for one parse call and logs each as it arrives.
pub struct Diagnostics<'s> {
    content: &'s str,
    syntax: Syntax,
    filename: Option<String>,
    entries: Vec<Diagnostic>,
}

impl<'s> Diagnostics<'s> {
    pub fn new(content: &'s str, syntax: Syntax, ctx: &ParseContext) -> Self {
        Self {
            content,
            syntax,
            filename: ctx.filename.clone(),
            entries: Vec::new(),
        }
    }

    /// Record a fault at `offset` and emit it through the log.
    pub fn report(&mut self, offset: usize, kind: impl Into<DiagnosticKind>) {
        let (line, column) = line_and_column(self.content, offset);
        let diagnostic = Diagnostic {
            syntax: self.syntax,
            offset,
            line,
            column,
            kind: kind.into(),
            filename: self.filename.clone(),
        };

        match self.syntax {
            Syntax::Json => tracing::error!(target: "libslz::json", "{}", diagnostic),
            Syntax::Yaml => tracing::error!(target: "libslz::yaml", "{}", diagnostic),
        }

        self.entries.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn content(&self) -> &'s str {
        self.content
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
