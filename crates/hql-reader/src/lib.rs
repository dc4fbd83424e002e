//! HQL S-expression reader.
//!
//! Parses HQL source text into an AST of literals, symbols and lists. Lists
//! remember whether they came from `(...)`, `[...]` or `{...}` surface
//! syntax; that provenance bit is what later lets the pattern parser tell a
//! destructuring vector apart from an ordinary call form.
//!
//! The reader also expands reader macros (`'`, `` ` ``, `~`, `~@`) and
//! splits interpolated strings into `(template-literal ...)` forms.

pub mod ast;
mod reader;

pub use ast::{Expr, ExprKind, ListKind, Literal};
pub use reader::read;
