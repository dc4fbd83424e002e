//! `quote` / `quasiquote` / `unquote` / `unquote-splicing`.
//!
//! Quote serializes the AST as data: symbols become strings, lists become
//! array literals, map literals become object literals. Inside quasiquote,
//! unquote re-enters normal lowering and unquote-splicing becomes a spread
//! element in the surrounding array literal.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind, ObjectProperty};
use hql_reader::{Expr, ExprKind, ListKind, Literal};

use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;

pub fn lower_quote(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [quoted] = form_args(expr) else {
        return Err(LowerError::validation(
            "quote",
            "exactly one form",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    quote_expr(ctx, quoted, false)
}

pub fn lower_quasiquote(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [quoted] = form_args(expr) else {
        return Err(LowerError::validation(
            "quasiquote",
            "exactly one form",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    quote_expr(ctx, quoted, true)
}

/// Straight recursive serialization. With `quasi` set, unquote forms
/// re-enter normal lowering.
fn quote_expr(ctx: &mut LowerCtx, expr: &Expr, quasi: bool) -> Result<Node, LowerError> {
    match &expr.kind {
        ExprKind::Literal(Literal::Null) => Ok(Node::null(expr.pos.clone())),
        ExprKind::Literal(Literal::Bool(b)) => Ok(Node::boolean(*b, expr.pos.clone())),
        ExprKind::Literal(Literal::Number(n)) => Ok(Node::number(*n, expr.pos.clone())),
        ExprKind::Literal(Literal::BigInt(raw)) => Ok(Node::new(
            NodeKind::BigIntLiteral { value: raw.clone() },
            expr.pos.clone(),
        )),
        ExprKind::Literal(Literal::Str(s)) => Ok(Node::string(s.clone(), expr.pos.clone())),
        ExprKind::Symbol(name) => Ok(Node::string(name.clone(), expr.pos.clone())),
        ExprKind::List { children, kind } => {
            if quasi {
                if let Some(inner) = unquote_payload(children, "unquote") {
                    return lower_value(ctx, inner);
                }
            }
            match kind {
                ListKind::MapLiteral => quote_map(ctx, &children[1..], expr, quasi),
                ListKind::VectorLiteral => quote_list(ctx, &children[1..], expr, quasi),
                ListKind::Parens => quote_list(ctx, children, expr, quasi),
            }
        }
    }
}

fn unquote_payload<'a>(children: &'a [Expr], form: &str) -> Option<&'a Expr> {
    match children {
        [head, inner] if head.is_symbol(form) => Some(inner),
        _ => None,
    }
}

fn quote_list(
    ctx: &mut LowerCtx,
    children: &[Expr],
    expr: &Expr,
    quasi: bool,
) -> Result<Node, LowerError> {
    let mut elements = Vec::with_capacity(children.len());
    for child in children {
        if quasi {
            if let Some(children) = child.list_children() {
                if let Some(inner) = unquote_payload(children, "unquote-splicing") {
                    let argument = lower_value(ctx, inner)?;
                    elements.push(Node::new(
                        NodeKind::SpreadElement {
                            argument: Box::new(argument),
                        },
                        child.pos.clone(),
                    ));
                    continue;
                }
            }
        }
        elements.push(quote_expr(ctx, child, quasi)?);
    }
    Ok(Node::new(
        NodeKind::ArrayExpression { elements },
        expr.pos.clone(),
    ))
}

fn quote_map(
    ctx: &mut LowerCtx,
    entries: &[Expr],
    expr: &Expr,
    quasi: bool,
) -> Result<Node, LowerError> {
    if entries.len() % 2 != 0 {
        return Err(LowerError::validation(
            "quoted map literal",
            "an even number of forms",
            format!("{} forms", entries.len()),
        )
        .with_pos(expr.pos.clone()));
    }
    let mut properties = Vec::with_capacity(entries.len() / 2);
    for pair in entries.chunks(2) {
        let key = match &pair[0].kind {
            ExprKind::Symbol(name) => name.clone(),
            ExprKind::Literal(Literal::Str(s)) => s.clone(),
            ExprKind::Literal(Literal::Number(n)) => n.to_string(),
            _ => {
                return Err(LowerError::validation(
                    "quoted map literal",
                    "a symbol, string or number key",
                    pair[0].describe(),
                )
                .with_pos(pair[0].pos.clone()));
            }
        };
        properties.push(ObjectProperty::KeyValue {
            key,
            value: quote_expr(ctx, &pair[1], quasi)?,
            computed: false,
        });
    }
    Ok(Node::new(
        NodeKind::ObjectExpression { properties },
        expr.pos.clone(),
    ))
}
