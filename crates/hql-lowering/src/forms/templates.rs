//! Template literal lowering.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind};
use hql_reader::{Expr, ExprKind, Literal};

use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;

/// `(template-literal piece...)` with string pieces and embedded
/// expressions in any interleaving.
///
/// Maintains the target-language invariant
/// `quasis.len() == expressions.len() + 1` by inserting empty quasis
/// around adjacent expressions and merging adjacent string pieces.
pub fn lower_template(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let mut quasis = Vec::new();
    let mut expressions = Vec::new();
    let mut current = String::new();

    for piece in form_args(expr) {
        match &piece.kind {
            ExprKind::Literal(Literal::Str(text)) => current.push_str(text),
            _ => {
                quasis.push(std::mem::take(&mut current));
                expressions.push(lower_value(ctx, piece)?);
            }
        }
    }
    quasis.push(current);

    debug_assert_eq!(quasis.len(), expressions.len() + 1);
    Ok(Node::new(
        NodeKind::TemplateLiteral {
            quasis,
            expressions,
        },
        expr.pos.clone(),
    ))
}
