//! First-class operators and the `=` assignment primitive.
//!
//! Called positionally, an operator lowers to binary/unary IR (n-ary
//! calls left-associate). Referenced as a value, an operator goes through
//! the reification helper instead — that path lives in the symbol
//! lowering; this module handles the call position.

use hql_common::LowerError;
use hql_ir::{AssignOp, BinaryOp, LogicalOp, Node, NodeKind, UnaryOp};
use hql_reader::Expr;

use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;
use crate::helpers::sanitize_identifier;

/// `(op args...)` for every first-class operator.
pub fn lower_operator_call(
    ctx: &mut LowerCtx,
    op: &str,
    expr: &Expr,
) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let pos = expr.pos.clone();

    // Unary spellings.
    match (op, args) {
        ("!", [operand]) => {
            return unary(ctx, UnaryOp::Not, operand, pos);
        }
        ("~", [operand]) => {
            return unary(ctx, UnaryOp::BitNot, operand, pos);
        }
        ("-", [operand]) => {
            return unary(ctx, UnaryOp::Neg, operand, pos);
        }
        ("+", [operand]) => {
            return unary(ctx, UnaryOp::Plus, operand, pos);
        }
        _ => {}
    }

    if args.len() < 2 {
        return Err(LowerError::validation(
            format!("operator `{op}`"),
            "at least two operands",
            format!("{} operands", args.len()),
        )
        .with_pos(pos));
    }

    if let Some(logical) = LogicalOp::from_symbol(op) {
        return fold_operands(ctx, args, &pos, |left, right| NodeKind::LogicalExpression {
            op: logical,
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    let Some(binary) = BinaryOp::from_symbol(op) else {
        return Err(LowerError::transform(
            format!("operator `{op}`"),
            "a known operator",
            "an unknown operator",
        )
        .with_pos(pos));
    };

    // Comparisons chain pairwise: `(< a b c)` means `a < b && b < c`.
    if matches!(
        binary,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
            | BinaryOp::StrictEq | BinaryOp::LooseEq
            | BinaryOp::StrictNe | BinaryOp::LooseNe
    ) && args.len() > 2
    {
        let values = args
            .iter()
            .map(|arg| lower_value(ctx, arg))
            .collect::<Result<Vec<Node>, LowerError>>()?;
        let mut comparisons = values
            .windows(2)
            .map(|pair| {
                Node::new(
                    NodeKind::BinaryExpression {
                        op: binary,
                        left: Box::new(pair[0].clone()),
                        right: Box::new(pair[1].clone()),
                    },
                    pos.clone(),
                )
            })
            .collect::<Vec<Node>>();
        let mut chained = comparisons.remove(0);
        for comparison in comparisons {
            chained = Node::new(
                NodeKind::LogicalExpression {
                    op: LogicalOp::And,
                    left: Box::new(chained),
                    right: Box::new(comparison),
                },
                pos.clone(),
            );
        }
        return Ok(chained);
    }

    fold_operands(ctx, args, &pos, |left, right| NodeKind::BinaryExpression {
        op: binary,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn unary(
    ctx: &mut LowerCtx,
    op: UnaryOp,
    operand: &Expr,
    pos: hql_common::Position,
) -> Result<Node, LowerError> {
    let argument = lower_value(ctx, operand)?;
    Ok(Node::new(
        NodeKind::UnaryExpression {
            op,
            argument: Box::new(argument),
            prefix: true,
        },
        pos,
    ))
}

/// Left-associative n-ary fold: `(+ a b c)` is `(a + b) + c`.
fn fold_operands(
    ctx: &mut LowerCtx,
    args: &[Expr],
    pos: &hql_common::Position,
    make: impl Fn(Node, Node) -> NodeKind,
) -> Result<Node, LowerError> {
    let mut values = args.iter().map(|arg| lower_value(ctx, arg));
    let mut acc = values.next().expect("arity checked by caller")?;
    for value in values {
        acc = Node::new(make(acc, value?), pos.clone());
    }
    Ok(acc)
}

/// `(= target value)` — assignment. Member-path targets become member
/// expressions, not the guarded-access node.
pub fn lower_assignment(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [target_expr, value_expr] = form_args(expr) else {
        return Err(LowerError::validation(
            "=",
            "`(= target value)` with exactly two forms",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };

    let target = lower_assignment_target(ctx, target_expr)?;
    let value = lower_value(ctx, value_expr)?;
    Ok(Node::new(
        NodeKind::AssignmentExpression {
            op: AssignOp::Assign,
            target: Box::new(target),
            value: Box::new(value),
        },
        expr.pos.clone(),
    ))
}

fn lower_assignment_target(ctx: &mut LowerCtx, target: &Expr) -> Result<Node, LowerError> {
    if let Some(name) = target.symbol_name() {
        if name.contains("?.") {
            return Err(LowerError::validation(
                "=",
                "a plain name or member path target",
                "an optional chain",
            )
            .with_pos(target.pos.clone()));
        }
        // `obj.field.inner` assigns through a member chain.
        if name.contains('.') && !name.starts_with('.') {
            let mut segments = name.split('.');
            let base = segments.next().unwrap_or_default();
            let mut node = Node::identifier(sanitize_identifier(base), target.pos.clone());
            for segment in segments {
                node = Node::member(
                    node,
                    Node::identifier(segment, target.pos.clone()),
                    false,
                    target.pos.clone(),
                );
            }
            return Ok(node);
        }
        return Ok(Node::identifier(
            sanitize_identifier(name),
            target.pos.clone(),
        ));
    }
    // `(js-get obj k)` and friends are valid targets too.
    lower_value(ctx, target)
}
