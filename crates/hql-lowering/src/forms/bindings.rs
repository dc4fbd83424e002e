//! Binding forms: `const` (alias `def`), `let`, `var`.
//!
//! Two surface shapes:
//! - global: `(kw name value)` — a variable declaration, destructuring
//!   allowed when the name is a vector/map pattern;
//! - local: `(kw (n1 v1 ...) body...)` or `(kw [n1 v1 ...] body...)` —
//!   declarations plus body packaged into an IIFE whose last expression
//!   is returned.
//!
//! `const` is immutable: its initializer is wrapped in the deep-freeze
//! helper. `let`/`var` initializers never are.

use hql_common::LowerError;
use hql_ir::{DeclarationKind, Node, NodeKind, Pattern, VariableDeclarator};
use hql_reader::{Expr, ExprKind, ListKind};

use crate::body::{iife_expression, lower_body_statements};
use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;
use crate::helpers::{HELPER_DEEP_FREEZE, sanitize_identifier, split_type_annotation};
use crate::patterns::{is_pattern_candidate, parse_pattern};
use crate::symbols::SymbolKind;

pub fn lower_binding(
    ctx: &mut LowerCtx,
    expr: &Expr,
    kind: DeclarationKind,
) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(target) = args.first() else {
        return Err(shape_error(kind, "no binding target").with_pos(expr.pos.clone()));
    };

    match &target.kind {
        // `(kw name value)` and `(kw name value body...)`.
        ExprKind::Symbol(name) => {
            if name.contains('.') {
                return Err(LowerError::validation(
                    format!("{} binding", kind.as_str()),
                    "a plain name (use `=` to assign to a member)",
                    format!("member path `{name}`"),
                )
                .with_pos(target.pos.clone()));
            }
            match args.len() {
                0 | 1 => Err(shape_error(kind, "a name without a value")
                    .with_pos(expr.pos.clone())),
                2 => lower_global_simple(ctx, expr, kind, name, &args[1]),
                // A name/value pair followed by a body is sugar for a
                // one-pair local binding.
                _ => lower_local(ctx, expr, kind, &args[..2], &args[2..]),
            }
        }
        ExprKind::List { children, kind: list_kind } => match list_kind {
            // `(kw (pairs...) body...)`
            ListKind::Parens => lower_local(ctx, expr, kind, children, &args[1..]),
            ListKind::VectorLiteral | ListKind::MapLiteral => {
                // A two-form tail where the bracket form parses as a
                // pattern is a global destructuring declaration;
                // otherwise the vector is a local bindings container.
                if args.len() == 2 {
                    if let Ok(pattern) = parse_pattern(ctx, target) {
                        if !pattern.is_identifier() {
                            return lower_global_pattern(ctx, expr, kind, pattern, &args[1]);
                        }
                    }
                }
                if *list_kind == ListKind::MapLiteral {
                    return Err(shape_error(kind, "a map literal outside binding position")
                        .with_pos(target.pos.clone()));
                }
                lower_local(ctx, expr, kind, &children[1..], &args[1..])
            }
        },
        ExprKind::Literal(_) => {
            Err(shape_error(kind, target.describe()).with_pos(target.pos.clone()))
        }
    }
}

fn shape_error(kind: DeclarationKind, found: impl Into<String>) -> LowerError {
    LowerError::validation(
        format!("{} binding", kind.as_str()),
        "`(kw name value)` or `(kw (bindings...) body...)`",
        found,
    )
}

/// Initializers of immutable bindings are deep-frozen.
fn freeze_if_const(kind: DeclarationKind, init: Node) -> Node {
    if kind == DeclarationKind::Const {
        let pos = init.pos.clone();
        Node::helper_call(HELPER_DEEP_FREEZE, vec![init], pos)
    } else {
        init
    }
}

fn declare_binding_symbol(ctx: &mut LowerCtx, name: &str, value: &Expr) {
    let callable = value.is_form("fn")
        || value.is_form("fn*")
        || value.is_form("=>")
        || value.is_form("async");
    let kind = if callable {
        SymbolKind::Function
    } else {
        SymbolKind::Variable
    };
    ctx.symbols.declare(name.to_string(), kind);
}

fn lower_global_simple(
    ctx: &mut LowerCtx,
    expr: &Expr,
    kind: DeclarationKind,
    name: &str,
    value: &Expr,
) -> Result<Node, LowerError> {
    let (id, annotation) = split_type_annotation(name);
    let id = sanitize_identifier(id);
    let init = lower_value(ctx, value).map_err(|e| e.with_pos(expr.pos.clone()))?;
    let init = freeze_if_const(kind, init);
    declare_binding_symbol(ctx, &id, value);
    Ok(Node::new(
        NodeKind::VariableDeclaration {
            kind,
            declarators: vec![VariableDeclarator {
                id: Pattern::Identifier { name: id },
                init: Some(init),
                type_annotation: annotation.map(str::to_string),
            }],
        },
        expr.pos.clone(),
    ))
}

fn lower_global_pattern(
    ctx: &mut LowerCtx,
    expr: &Expr,
    kind: DeclarationKind,
    pattern: Pattern,
    value: &Expr,
) -> Result<Node, LowerError> {
    let init = lower_value(ctx, value).map_err(|e| e.with_pos(expr.pos.clone()))?;
    let init = freeze_if_const(kind, init);
    for name in pattern.bound_names() {
        ctx.symbols.declare(name.to_string(), SymbolKind::Variable);
    }
    Ok(Node::new(
        NodeKind::VariableDeclaration {
            kind,
            declarators: vec![VariableDeclarator {
                id: pattern,
                init: Some(init),
                type_annotation: None,
            }],
        },
        expr.pos.clone(),
    ))
}

/// Local form: declarations plus body in an IIFE.
fn lower_local(
    ctx: &mut LowerCtx,
    expr: &Expr,
    kind: DeclarationKind,
    pairs: &[Expr],
    body: &[Expr],
) -> Result<Node, LowerError> {
    if pairs.len() % 2 != 0 {
        return Err(LowerError::validation(
            format!("{} binding", kind.as_str()),
            "name/value pairs",
            format!("{} forms", pairs.len()),
        )
        .with_pos(expr.pos.clone()));
    }
    if body.is_empty() {
        return Err(LowerError::validation(
            format!("{} binding", kind.as_str()),
            "a body after the bindings",
            "no body",
        )
        .with_pos(expr.pos.clone()));
    }

    ctx.with_iife(|ctx| {
        let mut statements = Vec::with_capacity(pairs.len() / 2 + body.len());
        for pair in pairs.chunks(2) {
            let (target, value) = (&pair[0], &pair[1]);
            let declarator = match &target.kind {
                ExprKind::Symbol(name) => {
                    let (id, annotation) = split_type_annotation(name);
                    let id = sanitize_identifier(id);
                    let init = lower_value(ctx, value)?;
                    declare_binding_symbol(ctx, &id, value);
                    VariableDeclarator {
                        id: Pattern::Identifier { name: id },
                        init: Some(freeze_if_const(kind, init)),
                        type_annotation: annotation.map(str::to_string),
                    }
                }
                _ if is_pattern_candidate(target) => {
                    let pattern = parse_pattern(ctx, target)?;
                    for name in pattern.bound_names() {
                        ctx.symbols.declare(name.to_string(), SymbolKind::Variable);
                    }
                    let init = lower_value(ctx, value)?;
                    VariableDeclarator {
                        id: pattern,
                        init: Some(freeze_if_const(kind, init)),
                        type_annotation: None,
                    }
                }
                _ => {
                    return Err(LowerError::validation(
                        format!("{} binding", kind.as_str()),
                        "a name or destructuring pattern",
                        target.describe(),
                    )
                    .with_pos(target.pos.clone()));
                }
            };
            statements.push(Node::new(
                NodeKind::VariableDeclaration {
                    kind,
                    declarators: vec![declarator],
                },
                target.pos.clone(),
            ));
        }

        statements.extend(lower_body_statements(ctx, body, true)?);
        Ok(iife_expression(statements, expr.pos.clone()))
    })
}
