//! Runtime error type.

use crate::value::Value;

/// Errors surfaced by the runtime library.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// A value had the wrong type for an operation.
    Type { message: String },
    /// A function was called with the wrong number of arguments.
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    /// An index was out of bounds (and no not-found value was supplied).
    IndexOutOfBounds { index: i64, count: Option<usize> },
    /// A user value thrown via the throw helper.
    Thrown(Value),
    /// A lazy seq forced itself during its own realization.
    ReentrantRealization,
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::Type {
            message: message.into(),
        }
    }

    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        RuntimeError::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Type { message } => write!(f, "type error: {message}"),
            RuntimeError::Arity {
                name,
                expected,
                got,
            } => write!(f, "arity error: {name} expects {expected} arguments, got {got}"),
            RuntimeError::IndexOutOfBounds { index, count } => match count {
                Some(count) => write!(f, "index {index} out of bounds for count {count}"),
                None => write!(f, "index {index} out of bounds"),
            },
            RuntimeError::Thrown(value) => write!(f, "thrown: {value}"),
            RuntimeError::ReentrantRealization => {
                write!(f, "lazy seq forced itself during realization")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result alias used throughout the runtime.
pub type RunResult<T> = Result<T, RuntimeError>;
