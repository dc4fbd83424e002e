//! Error types shared by the reader and the lowering pipeline.
//!
//! Two error kinds are first-class throughout the compiler:
//! - [`ParseError`] — produced only by the reader; always carries a position.
//! - [`LowerError`] — produced by lowering; carries a context string, the
//!   expected shape, and the position of the offending node.

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Which delimiter family a reader diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelimiterKind {
    /// `( ... )`
    List,
    /// `[ ... ]`
    Vector,
    /// `{ ... }`
    Map,
}

impl DelimiterKind {
    #[must_use]
    pub const fn open_char(self) -> char {
        match self {
            DelimiterKind::List => '(',
            DelimiterKind::Vector => '[',
            DelimiterKind::Map => '{',
        }
    }

    #[must_use]
    pub const fn close_char(self) -> char {
        match self {
            DelimiterKind::List => ')',
            DelimiterKind::Vector => ']',
            DelimiterKind::Map => '}',
        }
    }
}

impl std::fmt::Display for DelimiterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelimiterKind::List => write!(f, "list"),
            DelimiterKind::Vector => write!(f, "vector"),
            DelimiterKind::Map => write!(f, "map"),
        }
    }
}

/// Category of a reader failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorKind {
    /// EOF reached with at least one delimiter still open. Carries the
    /// delimiter family and the position where it was opened.
    Unclosed {
        which: DelimiterKind,
        opened_at: Position,
    },
    /// A close delimiter with no matching open.
    UnexpectedClose,
    /// A malformed numeric literal.
    BadNumber,
    /// An unterminated string literal.
    BadString,
    /// An unknown escape sequence inside a string literal.
    BadEscape,
    /// Nesting deeper than the reader's depth limit.
    TooDeep,
}

/// A reader failure. Parse errors abort reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Position of the offending token.
    pub pos: Position,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, pos: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            message: message.into(),
        }
    }

    pub fn unexpected_close(pos: Position, delimiter: char) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedClose,
            pos,
            format!("unexpected `{delimiter}` with no matching open delimiter"),
        )
    }

    pub fn unclosed(which: DelimiterKind, opened_at: Position, eof: Position) -> Self {
        let message = format!(
            "unclosed {which}: `{}` opened at {opened_at} was never closed",
            which.open_char()
        );
        Self::new(ParseErrorKind::Unclosed { which, opened_at }, eof, message)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.pos, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Whether a lowering failure came from shape validation or from the
/// transformation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LowerErrorKind {
    /// The form did not match its required shape.
    Validation,
    /// The form matched but could not be transformed.
    Transform,
}

/// A lowering failure. Aborts lowering of the enclosing top-level form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowerError {
    pub kind: LowerErrorKind,
    /// Human-readable description of what was being lowered.
    pub context: String,
    /// The shape the lowering expected.
    pub expected: String,
    /// What was actually seen.
    pub found: String,
    /// Position of the offending node, when known.
    pub pos: Option<Position>,
}

impl LowerError {
    pub fn validation(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            kind: LowerErrorKind::Validation,
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
            pos: None,
        }
    }

    pub fn transform(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            kind: LowerErrorKind::Transform,
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
            pos: None,
        }
    }

    /// Attach a position if none is set yet. Every lowering routine calls
    /// this with the enclosing list's position before propagating, so the
    /// innermost position wins.
    #[must_use]
    pub fn with_pos(mut self, pos: Position) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }
}

impl std::fmt::Display for LowerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            LowerErrorKind::Validation => "invalid form",
            LowerErrorKind::Transform => "cannot transform",
        };
        if let Some(pos) = &self.pos {
            write!(
                f,
                "{pos}: {kind} in {}: expected {}, found {}",
                self.context, self.expected, self.found
            )
        } else {
            write!(
                f,
                "{kind} in {}: expected {}, found {}",
                self.context, self.expected, self.found
            )
        }
    }
}

impl std::error::Error for LowerError {}
