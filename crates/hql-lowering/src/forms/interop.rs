//! JS interop forms: thin wrappers over member/new/call expressions with
//! explicit computed bits, plus the guarded-access variants.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind};
use hql_reader::Expr;

use crate::context::LowerCtx;
use crate::dispatch::{lower_call_args, lower_value};
use crate::forms::form_args;
use crate::helpers::is_identifier_like;

fn two_args<'a>(
    expr: &'a Expr,
    form: &str,
) -> Result<(&'a Expr, &'a Expr), LowerError> {
    match form_args(expr) {
        [a, b] => Ok((a, b)),
        args => Err(LowerError::validation(
            form,
            format!("`({form} obj key)` with exactly two forms"),
            format!("{} forms", args.len()),
        )
        .with_pos(expr.pos.clone())),
    }
}

/// Property node plus computed bit: identifier-like string keys use dot
/// access, everything else is computed.
fn property_node(ctx: &mut LowerCtx, key: &Expr) -> Result<(Node, bool), LowerError> {
    if let Some(name) = key.string_value() {
        if is_identifier_like(name) {
            return Ok((Node::identifier(name, key.pos.clone()), false));
        }
    }
    Ok((lower_value(ctx, key)?, true))
}

/// `(js-get obj key)` — member access.
pub fn lower_js_get(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let (obj, key) = two_args(expr, "js-get")?;
    let object = lower_value(ctx, obj)?;
    let (property, computed) = property_node(ctx, key)?;
    Ok(Node::member(object, property, computed, expr.pos.clone()))
}

/// `(js-set obj key value)` — member assignment.
pub fn lower_js_set(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [obj, key, value] = form_args(expr) else {
        return Err(LowerError::validation(
            "js-set",
            "`(js-set obj key value)` with exactly three forms",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let object = lower_value(ctx, obj)?;
    let (property, computed) = property_node(ctx, key)?;
    let target = Node::member(object, property, computed, expr.pos.clone());
    let value = lower_value(ctx, value)?;
    Ok(Node::new(
        NodeKind::AssignmentExpression {
            op: hql_ir::AssignOp::Assign,
            target: Box::new(target),
            value: Box::new(value),
        },
        expr.pos.clone(),
    ))
}

/// `(js-call obj method args...)` — a method call in one node.
pub fn lower_js_call(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let [obj, method, rest @ ..] = args else {
        return Err(LowerError::validation(
            "js-call",
            "`(js-call obj method args...)`",
            format!("{} forms", args.len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let object = lower_value(ctx, obj)?;
    let Some(method_name) = method.string_value().or_else(|| method.symbol_name()) else {
        return Err(LowerError::validation(
            "js-call",
            "a method name",
            method.describe(),
        )
        .with_pos(method.pos.clone()));
    };
    let arguments = lower_call_args(ctx, rest)?;
    Ok(Node::new(
        NodeKind::CallMemberExpression {
            object: Box::new(object),
            property: method_name.to_string(),
            arguments,
        },
        expr.pos.clone(),
    ))
}

/// `(js-method obj name)` — a method reference bound by the emitter.
pub fn lower_js_method(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let (obj, name) = two_args(expr, "js-method")?;
    let object = lower_value(ctx, obj)?;
    let Some(method) = name.string_value().or_else(|| name.symbol_name()) else {
        return Err(LowerError::validation(
            "js-method",
            "a method name",
            name.describe(),
        )
        .with_pos(name.pos.clone()));
    };
    Ok(Node::new(
        NodeKind::JsMethodAccess {
            object: Box::new(object),
            method: method.to_string(),
        },
        expr.pos.clone(),
    ))
}

/// `(js-get-invoke obj prop)` — guarded access on a possibly-null object:
/// the emitter produces a null-safe accessor IIFE.
pub fn lower_js_get_invoke(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let (obj, key) = two_args(expr, "js-get-invoke")?;
    let object = lower_value(ctx, obj)?;
    let Some(property) = key.string_value().or_else(|| key.symbol_name()) else {
        return Err(LowerError::validation(
            "js-get-invoke",
            "a property name",
            key.describe(),
        )
        .with_pos(key.pos.clone()));
    };
    Ok(Node::new(
        NodeKind::InteropIIFE {
            object: Box::new(object),
            property_path: vec![property.to_string()],
        },
        expr.pos.clone(),
    ))
}
