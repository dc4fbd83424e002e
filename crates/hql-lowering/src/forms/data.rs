//! Data-structure lowerings: `vector`, `hash-map`, `hash-set`, `new`.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind, ObjectProperty};
use hql_reader::{Expr, ExprKind, Literal};

use crate::context::LowerCtx;
use crate::dispatch::{lower_call_args, lower_element, lower_value, spread_argument, SpreadSource};
use crate::forms::form_args;
use crate::helpers::HELPER_HASH_MAP;

/// `(vector e...)` / `[e...]` — an array expression; elements may spread.
pub fn lower_vector(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let elements = form_args(expr)
        .iter()
        .map(|element| lower_element(ctx, element))
        .collect::<Result<Vec<Node>, LowerError>>()?;
    Ok(Node::new(
        NodeKind::ArrayExpression { elements },
        expr.pos.clone(),
    ))
}

/// `(hash-map k v ...)` / `{k v ...}`.
///
/// With no spread forms this is a call to the hash-map helper, which
/// preserves key semantics; with spread it must be an object literal so
/// `...` merge works. The two paths stringify keys identically, so
/// duplicate keys resolve last-wins either way.
pub fn lower_hash_map(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let has_spread = args.iter().any(|arg| spread_argument(arg).is_some());

    if !has_spread {
        if args.len() % 2 != 0 {
            return Err(LowerError::validation(
                "hash-map literal",
                "an even number of forms",
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
        let arguments = lower_call_args(ctx, args)?;
        return Ok(Node::helper_call(
            HELPER_HASH_MAP,
            arguments,
            expr.pos.clone(),
        ));
    }

    // Mixed properties and spread assignments.
    let mut properties = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(spread) = spread_argument(arg) {
            let argument = match spread {
                SpreadSource::Symbol(name) => lower_value(
                    ctx,
                    &Expr::symbol(name, arg.pos.clone()),
                )?,
                SpreadSource::Expr(inner) => lower_value(ctx, inner)?,
            };
            properties.push(ObjectProperty::SpreadAssignment { argument });
            i += 1;
            continue;
        }
        let Some(value) = args.get(i + 1) else {
            return Err(LowerError::validation(
                "hash-map literal",
                "a value after each key",
                format!("dangling key {}", arg.describe()),
            )
            .with_pos(arg.pos.clone()));
        };
        let (key, computed) = object_key(ctx, arg)?;
        let value = lower_value(ctx, value)?;
        properties.push(ObjectProperty::KeyValue {
            key,
            value,
            computed,
        });
        i += 2;
    }
    Ok(Node::new(
        NodeKind::ObjectExpression { properties },
        expr.pos.clone(),
    ))
}

/// Keys stringify the same way the hash-map helper stringifies them.
fn object_key(_ctx: &mut LowerCtx, key: &Expr) -> Result<(String, bool), LowerError> {
    match &key.kind {
        ExprKind::Symbol(name) => Ok((name.clone(), false)),
        ExprKind::Literal(Literal::Str(s)) => Ok((s.clone(), false)),
        ExprKind::Literal(Literal::Number(n)) => Ok((n.to_string(), false)),
        _ => Err(LowerError::validation(
            "hash-map literal",
            "a symbol, string or number key",
            key.describe(),
        )
        .with_pos(key.pos.clone())),
    }
}

/// `(hash-set e...)` — `new Set([e...])`.
pub fn lower_hash_set(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let elements = form_args(expr)
        .iter()
        .map(|element| lower_element(ctx, element))
        .collect::<Result<Vec<Node>, LowerError>>()?;
    let array = Node::new(NodeKind::ArrayExpression { elements }, expr.pos.clone());
    Ok(Node::new(
        NodeKind::NewExpression {
            callee: Box::new(Node::identifier("Set", expr.pos.clone())),
            arguments: vec![array],
        },
        expr.pos.clone(),
    ))
}

/// `(new C args...)` — `new C(args)`.
pub fn lower_new(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(ctor) = args.first() else {
        return Err(LowerError::validation(
            "new",
            "`(new Constructor args...)`",
            "no constructor",
        )
        .with_pos(expr.pos.clone()));
    };
    let callee = lower_value(ctx, ctor)?;
    let arguments = lower_call_args(ctx, &args[1..])?;
    Ok(Node::new(
        NodeKind::NewExpression {
            callee: Box::new(callee),
            arguments,
        },
        expr.pos.clone(),
    ))
}
