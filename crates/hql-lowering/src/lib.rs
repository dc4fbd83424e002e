//! AST→IR lowering pipeline for the HQL compiler.
//!
//! The dispatch router recognizes the special forms, one lowering module
//! per form family does the work, and the loop/recur optimizer turns the
//! restricted tail-recursive shape into a native `while`. The only
//! mutable state is the [`LowerCtx`] handle threaded through every
//! function.

pub mod body;
pub mod context;
pub mod dispatch;
pub mod forms;
pub mod helpers;
pub mod patterns;
pub mod rewrite;
pub mod symbols;

pub use context::{LoopFrame, LowerCtx};
pub use symbols::{SymbolKind, SymbolTable};

use hql_common::LowerError;
use hql_ir::Program;
use hql_reader::Expr;

/// Lower a parsed program to IR.
///
/// `current_dir` is the directory of the file being compiled; import
/// lowering uses it for relative-specifier handling.
pub fn lower(ast: &[Expr], current_dir: &str) -> Result<Program, LowerError> {
    dispatch::lower_program(ast, current_dir)
}
