//! Compiler API facade.
//!
//! The two entry points a front-end consumes: [`read`] (text to AST) and
//! [`lower`] (AST to IR), plus [`compile_source`] combining both. The
//! lowered [`Program`] is the boundary format handed to a JavaScript
//! emitter, which links the output against the `hql-runtime` helpers.

use hql_common::Diagnostic;
pub use hql_common::{LowerError, ParseError, Position};
pub use hql_ir::{Node, NodeKind, Program};
pub use hql_lowering::lower;
pub use hql_reader::{Expr, read};

/// A failure from either compilation phase.
#[derive(Debug, Clone)]
pub enum CompileError {
    Parse(ParseError),
    Lower(LowerError),
}

impl CompileError {
    /// Render the canonical diagnostic payload: file, line, column,
    /// context, expected shape, and what was actually seen.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Parse(err) => Diagnostic::from(err),
            CompileError::Lower(err) => Diagnostic::from(err),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "{err}"),
            CompileError::Lower(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<LowerError> for CompileError {
    fn from(err: LowerError) -> Self {
        CompileError::Lower(err)
    }
}

/// Read and lower HQL source text in one step.
pub fn compile_source(
    source: &str,
    file_path: &str,
    current_dir: &str,
) -> Result<Program, CompileError> {
    let ast = read(source, file_path)?;
    Ok(lower(&ast, current_dir)?)
}

/// The runtime helper name table, re-exported for emitters.
pub use hql_runtime::helpers::HELPERS as RUNTIME_HELPERS;
