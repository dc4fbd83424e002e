//! Position and span types for source location tracking.
//!
//! The reader produces line/column positions directly; `Span` records byte
//! offsets for the scanner, and `LineMap` converts between the two. Every AST
//! and IR node carries a `Position` so diagnostics can point at real source.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A position in a source file (1-indexed line, 0-indexed column).
///
/// Positions are cheap to clone; the file path is shared via `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 1-indexed line number
    pub line: u32,
    /// 0-indexed column in characters
    pub column: u32,
    /// Path of the file this position refers to
    pub file: Arc<str>,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, column: u32, file: Arc<str>) -> Self {
        Self { line, column, file }
    }

    /// A synthetic position for nodes with no source counterpart.
    #[must_use]
    pub fn synthetic() -> Self {
        Self {
            line: 0,
            column: 0,
            file: Arc::from("<synthetic>"),
        }
    }

    /// Whether this position was synthesized rather than read from source.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A span of source code, represented as a byte range.
///
/// Spans use half-open intervals: `[start, end)`.
/// An empty span has `start == end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span from start and end offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create an empty span at the given position.
    #[inline]
    pub const fn at(pos: u32) -> Self {
        Span {
            start: pos,
            end: pos,
        }
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create a span covering both.
    #[inline]
    pub const fn merge(&self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// Extract the slice of text covered by this span.
    #[inline]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let start = (self.start as usize).min(text.len());
        let end = (self.end as usize).min(text.len());
        text.get(start..end).unwrap_or("")
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A trait for types that have a source span.
pub trait Spanned {
    fn span(&self) -> Span;

    fn start(&self) -> u32 {
        self.span().start
    }

    fn end(&self) -> u32 {
        self.span().end
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

/// Line map for efficient offset <-> line/column conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (`line_starts[0]` is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = source.as_bytes();
        for i in memchr::memchr_iter(b'\n', bytes) {
            line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a (1-indexed line, 0-indexed column) pair.
    /// Column is counted in characters, not bytes.
    #[must_use]
    pub fn offset_to_line_col(&self, offset: u32, source: &str) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = usize::try_from(self.line_starts.get(line).copied().unwrap_or(0))
            .unwrap_or(usize::MAX)
            .min(source.len());
        let end = (offset as usize).min(source.len());
        let start = line_start.min(end);
        let column = source
            .get(start..end)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (
            u32::try_from(line + 1).unwrap_or(u32::MAX),
            u32::try_from(column).unwrap_or(u32::MAX),
        )
    }

    /// Get the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the starting offset of a line (0-indexed).
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }
}

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod tests;
