//! Early-return rewriting.
//!
//! A user `return` inside an IIFE-producing form lowers to a throw of the
//! sentinel object `{__hql_early_return__: true, value}`. Whenever a
//! *function body* (not the IIFE itself) contains such a throw, the body
//! is wrapped in a try/catch that unwraps the sentinel back into a real
//! return and rethrows everything else.

use hql_common::Position;
use hql_ir::visit::for_each_child;
use hql_ir::{CatchClause, LogicalOp, Node, NodeKind, ObjectProperty};

use crate::helpers::EARLY_RETURN_KEY;

/// Whether a node is the sentinel throw produced by a transformed early
/// return. User throws of other objects never match: the sentinel key is
/// checked structurally.
fn is_early_return_throw(node: &Node) -> bool {
    let NodeKind::ThrowStatement { argument } = &node.kind else {
        return false;
    };
    let NodeKind::ObjectExpression { properties } = &argument.kind else {
        return false;
    };
    properties.iter().any(|p| {
        matches!(
            p,
            ObjectProperty::KeyValue { key, .. } if key == EARLY_RETURN_KEY
        )
    })
}

/// Whether a function body needs the catch-and-unwrap wrapper.
///
/// The scan descends into immediately-called function expressions (the
/// IIFEs that `do`/`let`/`try`/`loop` lower to — a sentinel thrown there
/// must unwind to this function), but not into other nested functions,
/// which wrap their own bodies.
#[must_use]
pub fn contains_early_return(body: &Node) -> bool {
    if is_early_return_throw(body) {
        return true;
    }
    match &body.kind {
        NodeKind::CallExpression { callee, arguments } => {
            let in_iife = match &callee.kind {
                NodeKind::FunctionExpression { body, .. } => contains_early_return(body),
                _ => contains_early_return(callee),
            };
            in_iife || arguments.iter().any(contains_early_return)
        }
        NodeKind::FunctionExpression { .. }
        | NodeKind::FunctionDeclaration { .. }
        | NodeKind::FnFunctionDeclaration { .. } => false,
        _ => {
            let mut found = false;
            for_each_child(&body.kind, &mut |child| {
                if !found {
                    found = contains_early_return(child);
                }
            });
            found
        }
    }
}

/// Wrap a lowered function body when it contains transformed early
/// returns; otherwise return it unchanged.
#[must_use]
pub fn wrap_function_body(body: Node) -> Node {
    if !contains_early_return(&body) {
        return body;
    }
    let pos = body.pos.clone();
    Node::block(vec![unwrap_try(body, pos.clone())], pos)
}

/// ```text
/// try { <body> }
/// catch (e) { if (e && e.__hql_early_return__) return e.value; throw e; }
/// ```
fn unwrap_try(body: Node, pos: Position) -> Node {
    let e = |pos: &Position| Node::identifier("e", pos.clone());

    let sentinel_test = Node::new(
        NodeKind::LogicalExpression {
            op: LogicalOp::And,
            left: Box::new(e(&pos)),
            right: Box::new(Node::member(
                e(&pos),
                Node::identifier(EARLY_RETURN_KEY, pos.clone()),
                false,
                pos.clone(),
            )),
        },
        pos.clone(),
    );
    let return_value = Node::ret(
        Some(Node::member(
            e(&pos),
            Node::identifier("value", pos.clone()),
            false,
            pos.clone(),
        )),
        pos.clone(),
    );
    let rethrow = Node::new(
        NodeKind::ThrowStatement {
            argument: Box::new(e(&pos)),
        },
        pos.clone(),
    );
    let handler_body = Node::block(
        vec![
            Node::new(
                NodeKind::IfStatement {
                    test: Box::new(sentinel_test),
                    consequent: Box::new(return_value),
                    alternate: None,
                },
                pos.clone(),
            ),
            rethrow,
        ],
        pos.clone(),
    );

    Node::new(
        NodeKind::TryStatement {
            block: Box::new(body),
            handler: Some(CatchClause {
                param: Some("e".to_string()),
                body: Box::new(handler_body),
            }),
            finalizer: None,
        },
        pos,
    )
}
