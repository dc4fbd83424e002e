//! The canonical expression-vs-statement classification.
//!
//! Exactly one predicate decides which IR kinds are expressions. The
//! dispatch router uses it to wrap top-level expressions in
//! `ExpressionStatement`; the binding and do-block lowerings use it to
//! decide what needs a `return` wrapper. Divergent classifications cause
//! double-wrapped or unwrapped expression statements, so nothing else in
//! the workspace may re-enumerate these kinds.

use crate::node::NodeKind;

/// Whether `kind` is an expression.
#[must_use]
pub fn is_expression(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Identifier { .. }
        | NodeKind::StringLiteral { .. }
        | NodeKind::NumericLiteral { .. }
        | NodeKind::BooleanLiteral { .. }
        | NodeKind::NullLiteral
        | NodeKind::BigIntLiteral { .. }
        | NodeKind::TemplateLiteral { .. }
        | NodeKind::ArrayExpression { .. }
        | NodeKind::ObjectExpression { .. }
        | NodeKind::CallExpression { .. }
        | NodeKind::NewExpression { .. }
        | NodeKind::MemberExpression { .. }
        | NodeKind::OptionalMemberExpression { .. }
        | NodeKind::CallMemberExpression { .. }
        | NodeKind::BinaryExpression { .. }
        | NodeKind::LogicalExpression { .. }
        | NodeKind::UnaryExpression { .. }
        | NodeKind::UpdateExpression { .. }
        | NodeKind::AssignmentExpression { .. }
        | NodeKind::ConditionalExpression { .. }
        | NodeKind::AwaitExpression { .. }
        | NodeKind::YieldExpression { .. }
        | NodeKind::FunctionExpression { .. }
        | NodeKind::SpreadElement { .. }
        | NodeKind::InteropIIFE { .. }
        | NodeKind::JsMethodAccess { .. }
        | NodeKind::DynamicImport { .. } => true,

        NodeKind::ExpressionStatement { .. }
        | NodeKind::BlockStatement { .. }
        | NodeKind::ReturnStatement { .. }
        | NodeKind::ThrowStatement { .. }
        | NodeKind::IfStatement { .. }
        | NodeKind::WhileStatement { .. }
        | NodeKind::ForStatement { .. }
        | NodeKind::ForOfStatement { .. }
        | NodeKind::LabeledStatement { .. }
        | NodeKind::BreakStatement { .. }
        | NodeKind::ContinueStatement { .. }
        | NodeKind::TryStatement { .. }
        | NodeKind::VariableDeclaration { .. }
        | NodeKind::FunctionDeclaration { .. }
        | NodeKind::FnFunctionDeclaration { .. }
        | NodeKind::ClassDeclaration { .. }
        | NodeKind::EnumDeclaration { .. }
        | NodeKind::ImportDeclaration { .. }
        | NodeKind::ExportNamedDeclaration { .. }
        | NodeKind::ExportVariableDeclaration { .. }
        | NodeKind::ExportDefaultDeclaration { .. }
        | NodeKind::TypeAliasDeclaration { .. }
        | NodeKind::InterfaceDeclaration { .. } => false,
    }
}

/// Whether `kind` is a control-flow statement that must never be wrapped
/// in a `return` (the branch already transfers control).
#[must_use]
pub fn is_control_flow(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ReturnStatement { .. }
            | NodeKind::ThrowStatement { .. }
            | NodeKind::BreakStatement { .. }
            | NodeKind::ContinueStatement { .. }
    )
}
