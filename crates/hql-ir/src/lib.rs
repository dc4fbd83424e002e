//! Typed intermediate representation for the HQL compiler.
//!
//! The IR approximates an ECMAScript AST with a handful of HQL-specific
//! nodes (`InteropIIFE`, `JsMethodAccess`, the named-lambda declaration).
//! It is the boundary format between the lowering pipeline and the
//! out-of-scope JavaScript emitter, so every type here derives serde.
//!
//! The canonical expression-vs-statement classification lives in
//! [`classify`]; the dispatch router, the binding lowerer and the do-block
//! lowerer all consult the same predicate.

pub mod classify;
pub mod node;
pub mod ops;
pub mod visit;

pub use classify::is_expression;
pub use node::{
    CatchClause, ClassConstructor, ClassField, ClassMethod, DeclarationKind, EnumCase,
    ExportSpecifier, ImportSpecifier, MethodKind, Node, NodeKind, ObjectPatternEntry,
    ObjectProperty, Param, Pattern, Program, VariableDeclarator,
};
pub use ops::{AssignOp, BinaryOp, LogicalOp, UnaryOp, UpdateOp};
