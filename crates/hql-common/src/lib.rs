//! Common types and utilities for the HQL compiler.
//!
//! This crate provides foundational types used across all hql crates:
//! - Source positions (`Position`, `Span`, `LineMap`)
//! - Error types (`ParseError`, `LowerError`) and diagnostic rendering
//! - Compiler limits and thresholds

// Position/Span types for source locations
pub mod position;
pub use position::{LineMap, Position, Span, Spanned};

// Error types shared by the reader and the lowering pipeline
pub mod error;
pub use error::{DelimiterKind, LowerError, LowerErrorKind, ParseError, ParseErrorKind};

// Diagnostic rendering
pub mod diagnostics;
pub use diagnostics::Diagnostic;

// Centralized limits and thresholds
pub mod limits;
