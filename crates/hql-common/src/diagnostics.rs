//! User-visible diagnostic rendering.
//!
//! Both error families render to the same payload: file, line, column, a
//! human-readable context, the expected shape, and what was actually seen.
//! Editor layers consume this payload; the rendering here is the canonical
//! plain-text form.

use serde::{Deserialize, Serialize};

use crate::error::{LowerError, ParseError};
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A rendered diagnostic, ready for display or for the editor layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub file: String,
    /// 1-indexed line, 0 when unknown.
    pub line: u32,
    /// 0-indexed column.
    pub column: u32,
    pub message: String,
    /// What was being processed when the failure occurred.
    pub context: Option<String>,
    pub expected: Option<String>,
    pub found: Option<String>,
}

impl Diagnostic {
    pub fn error(pos: &Position, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            file: pos.file.to_string(),
            line: pos.line,
            column: pos.column,
            message: message.into(),
            context: None,
            expected: None,
            found: None,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic::error(&err.pos, err.message.clone())
    }
}

impl From<&LowerError> for Diagnostic {
    fn from(err: &LowerError) -> Self {
        let mut diag = match &err.pos {
            Some(pos) => Diagnostic::error(pos, err.to_string()),
            None => Diagnostic {
                severity: DiagnosticSeverity::Error,
                file: String::new(),
                line: 0,
                column: 0,
                message: err.to_string(),
                context: None,
                expected: None,
                found: None,
            },
        };
        diag.context = Some(err.context.clone());
        diag.expected = Some(err.expected.clone());
        diag.found = Some(err.found.clone());
        diag
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}:{}: ", self.file, self.line, self.column)?;
        }
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
