//! Conditionals and sequencing: `if`, `?`, `do`, `return`, `throw`,
//! `switch`.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind, ObjectProperty};
use hql_reader::Expr;

use crate::body::{iife_expression, lower_body_statements};
use crate::context::LowerCtx;
use crate::dispatch::{ensure_statement, lower_expr, lower_value};
use crate::forms::form_args;
use crate::helpers::EARLY_RETURN_KEY;

/// Whether the AST subtree contains a `(name ...)` form, not counting
/// nested function bodies (those own their control flow).
pub(crate) fn ast_contains_form(expr: &Expr, name: &str) -> bool {
    let Some(children) = expr.list_children() else {
        return false;
    };
    if let Some(head) = children.first() {
        if head.is_symbol(name) {
            return true;
        }
        if head.is_symbol("fn") || head.is_symbol("fn*") || head.is_symbol("=>") {
            return false;
        }
    }
    children.iter().any(|child| ast_contains_form(child, name))
}

/// `(if test then else?)`.
///
/// Value branches flow out as a `ConditionalExpression`; a branch that
/// lowers to a statement (control flow included) forces an `IfStatement`.
pub fn lower_if(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let (test, then, alt) = match args {
        [test, then] => (test, then, None),
        [test, then, alt] => (test, then, Some(alt)),
        _ => {
            return Err(LowerError::validation(
                "if",
                "`(if test then else?)`",
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
    };

    let test = lower_value(ctx, test)?;
    let consequent = lower_expr(ctx, then)?;
    let alternate = alt.map(|a| lower_expr(ctx, a)).transpose()?;

    let all_expressions = consequent.is_expression()
        && alternate.as_ref().is_none_or(|a| a.is_expression());

    if all_expressions {
        let alternate = alternate.unwrap_or_else(|| Node::null(expr.pos.clone()));
        return Ok(Node::new(
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            expr.pos.clone(),
        ));
    }

    Ok(Node::new(
        NodeKind::IfStatement {
            test: Box::new(test),
            consequent: Box::new(ensure_statement(consequent)),
            alternate: alternate.map(|a| Box::new(ensure_statement(a))),
        },
        expr.pos.clone(),
    ))
}

/// `(? test then else)` — the expression-only ternary.
pub fn lower_ternary(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let [test, then, alt] = args else {
        return Err(LowerError::validation(
            "?",
            "`(? test then else)` with exactly three forms",
            format!("{} forms", args.len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let test = lower_value(ctx, test)?;
    let consequent = lower_value(ctx, then)?;
    let alternate = lower_value(ctx, alt)?;
    Ok(Node::new(
        NodeKind::ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        },
        expr.pos.clone(),
    ))
}

/// `(do body...)`.
///
/// A single body expression with no inner `return` unwraps; everything
/// else packages into an IIFE with the last expression returned.
pub fn lower_do(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let body = form_args(expr);
    if body.is_empty() {
        return Ok(Node::null(expr.pos.clone()));
    }
    if body.len() == 1 && !ast_contains_form(&body[0], "return") {
        return lower_expr(ctx, &body[0]);
    }
    ctx.with_iife(|ctx| {
        let statements = lower_body_statements(ctx, body, true)?;
        Ok(iife_expression(statements, expr.pos.clone()))
    })
}

/// `(return value?)`.
///
/// Inside any IIFE this reifies as a sentinel-object throw; the enclosing
/// function body grows a catch-and-unwrap wrapper (see the early-return
/// rewriter). Outside IIFEs it is a plain return.
pub fn lower_return(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let value = match args {
        [] => None,
        [value] => Some(lower_value(ctx, value)?),
        _ => {
            return Err(LowerError::validation(
                "return",
                "`(return value?)`",
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
    };

    if ctx.iife_depth() > 0 {
        let value = value.unwrap_or_else(|| {
            Node::new(
                NodeKind::Identifier {
                    name: "undefined".to_string(),
                },
                expr.pos.clone(),
            )
        });
        let sentinel = Node::new(
            NodeKind::ObjectExpression {
                properties: vec![
                    ObjectProperty::KeyValue {
                        key: EARLY_RETURN_KEY.to_string(),
                        value: Node::boolean(true, expr.pos.clone()),
                        computed: false,
                    },
                    ObjectProperty::KeyValue {
                        key: "value".to_string(),
                        value,
                        computed: false,
                    },
                ],
            },
            expr.pos.clone(),
        );
        return Ok(Node::new(
            NodeKind::ThrowStatement {
                argument: Box::new(sentinel),
            },
            expr.pos.clone(),
        ));
    }

    Ok(Node::ret(value, expr.pos.clone()))
}

/// `(throw value)`.
pub fn lower_throw(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [value] = form_args(expr) else {
        return Err(LowerError::validation(
            "throw",
            "`(throw value)` with exactly one form",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let argument = lower_value(ctx, value)?;
    Ok(Node::new(
        NodeKind::ThrowStatement {
            argument: Box::new(argument),
        },
        expr.pos.clone(),
    ))
}

/// `(switch subject (case v body...)... (default body...)?)`.
///
/// Lowers to an IIFE holding the subject once and running an if/else-if
/// chain of strict-equality tests, so switch works in expression
/// position like every other form.
pub fn lower_switch(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(subject) = args.first() else {
        return Err(LowerError::validation(
            "switch",
            "`(switch subject clauses...)`",
            "no subject",
        )
        .with_pos(expr.pos.clone()));
    };

    ctx.with_iife(|ctx| {
        let pos = expr.pos.clone();
        let subject_name = "__hql_switch";
        let mut statements = vec![Node::new(
            NodeKind::VariableDeclaration {
                kind: hql_ir::DeclarationKind::Const,
                declarators: vec![hql_ir::VariableDeclarator {
                    id: hql_ir::Pattern::Identifier {
                        name: subject_name.to_string(),
                    },
                    init: Some(lower_value(ctx, subject)?),
                    type_annotation: None,
                }],
            },
            subject.pos.clone(),
        )];

        let mut chain: Option<Node> = None;
        for clause in args[1..].iter().rev() {
            let Some(children) = clause.list_children() else {
                return Err(LowerError::validation(
                    "switch",
                    "`(case value body...)` or `(default body...)` clauses",
                    clause.describe(),
                )
                .with_pos(clause.pos.clone()));
            };
            let head = children.first().and_then(|h| h.symbol_name());
            match head {
                Some("default") => {
                    let block =
                        Node::block(lower_body_statements(ctx, &children[1..], true)?, pos.clone());
                    chain = Some(block);
                }
                Some("case") if children.len() >= 2 => {
                    let test = Node::new(
                        NodeKind::BinaryExpression {
                            op: hql_ir::BinaryOp::StrictEq,
                            left: Box::new(Node::identifier(subject_name, clause.pos.clone())),
                            right: Box::new(lower_value(ctx, &children[1])?),
                        },
                        clause.pos.clone(),
                    );
                    let block =
                        Node::block(lower_body_statements(ctx, &children[2..], true)?, pos.clone());
                    chain = Some(Node::new(
                        NodeKind::IfStatement {
                            test: Box::new(test),
                            consequent: Box::new(block),
                            alternate: chain.map(Box::new),
                        },
                        clause.pos.clone(),
                    ));
                }
                _ => {
                    return Err(LowerError::validation(
                        "switch",
                        "`(case value body...)` or `(default body...)` clauses",
                        clause.describe(),
                    )
                    .with_pos(clause.pos.clone()));
                }
            }
        }

        if let Some(chain) = chain {
            statements.push(chain);
        }
        statements.push(Node::ret(Some(Node::null(pos.clone())), pos.clone()));
        Ok(iife_expression(statements, pos))
    })
}
