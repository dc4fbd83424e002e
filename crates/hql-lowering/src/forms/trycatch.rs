//! `try` / `catch` / `finally`.

use hql_common::LowerError;
use hql_ir::{CatchClause, Node, NodeKind};
use hql_reader::Expr;

use crate::body::{iife_expression, lower_body_statements};
use crate::context::LowerCtx;
use crate::forms::form_args;
use crate::helpers::sanitize_identifier;

/// `(try body... (catch e body...)? (finally body...)?)`.
///
/// Body forms run to the first `catch`/`finally` clause. The try and
/// catch bodies get an implicit return on their last expression; the
/// finalizer does not. The whole statement is packaged into an IIFE so
/// `try` works in expression position; `await` anywhere in a sub-body
/// makes that IIFE async.
pub fn lower_try(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let clause_start = args
        .iter()
        .position(|form| form.is_form("catch") || form.is_form("finally"))
        .unwrap_or(args.len());
    let (body, clauses) = args.split_at(clause_start);

    if body.is_empty() {
        return Err(LowerError::validation(
            "try",
            "a non-empty body before catch/finally",
            "an empty body",
        )
        .with_pos(expr.pos.clone()));
    }

    let mut handler: Option<(&Expr, &[Expr])> = None;
    let mut finalizer_body: Option<&[Expr]> = None;
    for clause in clauses {
        let children = clause.list_children().unwrap_or(&[]);
        if clause.is_form("catch") {
            if handler.is_some() {
                return Err(LowerError::validation(
                    "try",
                    "at most one catch clause",
                    "a second catch",
                )
                .with_pos(clause.pos.clone()));
            }
            if children.len() < 3 {
                return Err(LowerError::validation(
                    "catch",
                    "`(catch name body...)` with a non-empty body",
                    format!("{} forms", children.len().saturating_sub(1)),
                )
                .with_pos(clause.pos.clone()));
            }
            handler = Some((&children[1], &children[2..]));
        } else if clause.is_form("finally") {
            if finalizer_body.is_some() {
                return Err(LowerError::validation(
                    "try",
                    "at most one finally clause",
                    "a second finally",
                )
                .with_pos(clause.pos.clone()));
            }
            if children.len() < 2 {
                return Err(LowerError::validation(
                    "finally",
                    "`(finally body...)` with a non-empty body",
                    "an empty body",
                )
                .with_pos(clause.pos.clone()));
            }
            finalizer_body = Some(&children[1..]);
        } else {
            return Err(LowerError::validation(
                "try",
                "only catch/finally after the body",
                clause.describe(),
            )
            .with_pos(clause.pos.clone()));
        }
    }

    ctx.with_iife(|ctx| {
        let block = Node::block(lower_body_statements(ctx, body, true)?, expr.pos.clone());

        let handler = handler
            .map(|(param, catch_body)| {
                let param_name = match param.symbol_name() {
                    Some("_") => None,
                    Some(name) => Some(sanitize_identifier(name)),
                    None => {
                        return Err(LowerError::validation(
                            "catch",
                            "a symbol binding for the caught value",
                            param.describe(),
                        )
                        .with_pos(param.pos.clone()));
                    }
                };
                let body = Node::block(
                    lower_body_statements(ctx, catch_body, true)?,
                    param.pos.clone(),
                );
                Ok(CatchClause {
                    param: param_name,
                    body: Box::new(body),
                })
            })
            .transpose()?;

        let finalizer = finalizer_body
            .map(|forms| {
                Ok::<Node, LowerError>(Node::block(
                    lower_body_statements(ctx, forms, false)?,
                    expr.pos.clone(),
                ))
            })
            .transpose()?;

        let try_stmt = Node::new(
            NodeKind::TryStatement {
                block: Box::new(block),
                handler,
                finalizer: finalizer.map(Box::new),
            },
            expr.pos.clone(),
        );
        Ok(iife_expression(vec![try_stmt], expr.pos.clone()))
    })
}
