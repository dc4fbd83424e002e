//! Shared body-to-block lowering and IIFE packaging.
//!
//! Binding forms, `do`, and `try` all package statement sequences into
//! zero-argument IIFEs whose last expression becomes a `return`. When a
//! lowered body contains `await` or `yield` (outside nested functions),
//! the IIFE is marked async/generator and the call site is wrapped in
//! `await` / `yield*` so the effect reaches the enclosing function.

use hql_common::{LowerError, Position};
use hql_ir::visit::any_in_tree;
use hql_ir::{Node, NodeKind, classify};
use hql_reader::Expr;

use crate::context::LowerCtx;
use crate::dispatch::{ensure_statement, lower_expr};

/// Lower a body sequence into statements. With `implicit_return`, the
/// last expression is wrapped in `return`; control-flow statements are
/// never double-wrapped.
pub fn lower_body_statements(
    ctx: &mut LowerCtx,
    body: &[Expr],
    implicit_return: bool,
) -> Result<Vec<Node>, LowerError> {
    let mut statements = Vec::with_capacity(body.len());
    for (i, form) in body.iter().enumerate() {
        let is_last = i + 1 == body.len();
        let node = lower_expr(ctx, form)?;
        if is_last && implicit_return {
            statements.push(returned(node));
        } else {
            statements.push(ensure_statement(node));
        }
    }
    Ok(statements)
}

/// Wrap a final node in `return` when it is an expression; statements
/// that already transfer control (or cannot produce a value) pass
/// through.
#[must_use]
pub fn returned(node: Node) -> Node {
    if node.is_expression() {
        let pos = node.pos.clone();
        Node::ret(Some(node), pos)
    } else {
        node
    }
}

/// Whether any of `statements` contains an await (resp. yield) that the
/// enclosing IIFE must absorb. Nested functions own their effects.
#[must_use]
pub fn async_generator_effects(statements: &[Node]) -> (bool, bool) {
    let has_await = statements.iter().any(|s| {
        any_in_tree(s, false, &|n| {
            matches!(n.kind, NodeKind::AwaitExpression { .. })
        })
    });
    let has_yield = statements.iter().any(|s| {
        any_in_tree(s, false, &|n| {
            matches!(n.kind, NodeKind::YieldExpression { .. })
        })
    });
    (has_await, has_yield)
}

/// Package statements into an IIFE expression, marking async/generator
/// from the body's own effects and wrapping the call so the effect
/// propagates outward.
#[must_use]
pub fn iife_expression(statements: Vec<Node>, pos: Position) -> Node {
    let (is_async, is_generator) = async_generator_effects(&statements);
    let block = Node::block(statements, pos.clone());
    let call = Node::iife(block, is_async, is_generator, pos.clone());
    wrap_effectful_call(call, is_async, is_generator, pos)
}

/// `await (async () => ...)()` / `yield* (function* () ...)()`.
#[must_use]
pub fn wrap_effectful_call(
    call: Node,
    is_async: bool,
    is_generator: bool,
    pos: Position,
) -> Node {
    let call = if is_generator {
        Node::new(
            NodeKind::YieldExpression {
                argument: Some(Box::new(call)),
                delegate: true,
            },
            pos.clone(),
        )
    } else {
        call
    };
    if is_async {
        Node::new(
            NodeKind::AwaitExpression {
                argument: Box::new(call),
            },
            pos,
        )
    } else {
        call
    }
}

/// Whether a lowered node is one of the control-flow statements a branch
/// may end with.
#[must_use]
pub fn is_control_flow(node: &Node) -> bool {
    classify::is_control_flow(&node.kind)
}
