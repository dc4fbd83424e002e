//! Function forms: `fn`, `fn*`, `=>`, `async`, `await`, `yield`,
//! `yield*`.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind, ObjectPatternEntry, Param, Pattern};
use hql_reader::{Expr, ExprKind, ListKind};

use crate::body::lower_body_statements;
use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;
use crate::helpers::{sanitize_identifier, split_type_annotation};
use crate::patterns::{is_pattern_candidate, parse_pattern};
use crate::rewrite::early_return::wrap_function_body;
use crate::symbols::SymbolKind;

/// `(fn name? [params] body...)` / `(fn* ...)` for generators.
///
/// Named functions lower to the named-lambda declaration; anonymous ones
/// to a function expression. Bodies end with an implicit return of the
/// last expression.
pub fn lower_fn(
    ctx: &mut LowerCtx,
    expr: &Expr,
    is_async: bool,
    is_generator: bool,
) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let (name, params_expr, body) = match args {
        [first, params, body @ ..] if first.symbol_name().is_some() => {
            (first.symbol_name(), params, body)
        }
        [params, body @ ..] => (None, params, body),
        [] => {
            return Err(LowerError::validation(
                "fn",
                "`(fn name? [params] body...)`",
                "no parameter list",
            )
            .with_pos(expr.pos.clone()));
        }
    };

    let params = parse_params(ctx, params_expr)?;
    let body = lower_function_body(ctx, body, &expr.pos)?;

    match name {
        Some(name) => {
            let id = sanitize_identifier(split_type_annotation(name).0);
            ctx.symbols.declare(id.clone(), SymbolKind::Fn);
            Ok(Node::new(
                NodeKind::FnFunctionDeclaration {
                    id,
                    params,
                    body: Box::new(body),
                    is_async,
                    is_generator,
                },
                expr.pos.clone(),
            ))
        }
        None => Ok(Node::new(
            NodeKind::FunctionExpression {
                id: None,
                params,
                body: Box::new(body),
                is_async,
                is_generator,
            },
            expr.pos.clone(),
        )),
    }
}

/// `(=> [params] body...)` — an anonymous lambda.
pub fn lower_arrow(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let [params_expr, body @ ..] = args else {
        return Err(LowerError::validation(
            "=>",
            "`(=> [params] body...)`",
            "no parameter list",
        )
        .with_pos(expr.pos.clone()));
    };
    let params = parse_params(ctx, params_expr)?;
    let body = lower_function_body(ctx, body, &expr.pos)?;
    Ok(Node::new(
        NodeKind::FunctionExpression {
            id: None,
            params,
            body: Box::new(body),
            is_async: false,
            is_generator: false,
        },
        expr.pos.clone(),
    ))
}

/// `(async (fn ...))` / `(async fn ...)` — wraps a function form and sets
/// its async flag.
pub fn lower_async(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    // `(async fn name [params] body)` is accepted as sugar by re-wrapping
    // the tail as a fn form.
    if let Some(head) = args.first() {
        if head.is_symbol("fn") || head.is_symbol("fn*") {
            let inner = Expr::list(args.to_vec(), expr.pos.clone());
            let is_generator = head.is_symbol("fn*");
            return lower_fn(ctx, &inner, true, is_generator);
        }
    }
    let [inner] = args else {
        return Err(LowerError::validation(
            "async",
            "`(async (fn ...))` with one function form",
            format!("{} forms", args.len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let lowered = lower_value(ctx, inner)?;
    match lowered.kind {
        NodeKind::FunctionExpression {
            id,
            params,
            body,
            is_generator,
            ..
        } => Ok(Node::new(
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                is_async: true,
                is_generator,
            },
            lowered.pos,
        )),
        _ => Err(LowerError::validation(
            "async",
            "a function form to mark async",
            "a non-function form",
        )
        .with_pos(inner.pos.clone())),
    }
}

/// `(await x)`.
pub fn lower_await(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [value] = form_args(expr) else {
        return Err(LowerError::validation(
            "await",
            "`(await expr)` with exactly one form",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let argument = lower_value(ctx, value)?;
    Ok(Node::new(
        NodeKind::AwaitExpression {
            argument: Box::new(argument),
        },
        expr.pos.clone(),
    ))
}

/// `(yield x?)` / `(yield* x)` — the delegate bit follows the form name.
pub fn lower_yield(
    ctx: &mut LowerCtx,
    expr: &Expr,
    delegate: bool,
) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let argument = match args {
        [] if !delegate => None,
        [value] => Some(Box::new(lower_value(ctx, value)?)),
        _ => {
            return Err(LowerError::validation(
                if delegate { "yield*" } else { "yield" },
                "at most one form",
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
    };
    Ok(Node::new(
        NodeKind::YieldExpression { argument, delegate },
        expr.pos.clone(),
    ))
}

/// Lower a function body with fresh loop/label/IIFE state, an implicit
/// return of the last expression, and the early-return unwrap wrapper
/// when the body needs one.
pub fn lower_function_body(
    ctx: &mut LowerCtx,
    body: &[Expr],
    pos: &hql_common::Position,
) -> Result<Node, LowerError> {
    let statements = ctx.with_function_boundary(|ctx| lower_body_statements(ctx, body, true))?;
    Ok(wrap_function_body(Node::block(statements, pos.clone())))
}

/// Parse a parameter list: defaults, destructuring patterns, rest, type
/// annotations, and the single-map "JSON map" style.
pub fn parse_params(ctx: &mut LowerCtx, params_expr: &Expr) -> Result<Vec<Param>, LowerError> {
    let ExprKind::List { children, kind } = &params_expr.kind else {
        return Err(LowerError::validation(
            "parameter list",
            "`[param...]`",
            params_expr.describe(),
        )
        .with_pos(params_expr.pos.clone()));
    };
    let elements: &[Expr] = match kind {
        ListKind::VectorLiteral => &children[1..],
        ListKind::Parens => children,
        ListKind::MapLiteral => {
            return Err(LowerError::validation(
                "parameter list",
                "`[param...]`",
                "a map literal",
            )
            .with_pos(params_expr.pos.clone()));
        }
    };

    // "JSON map" style: a single hash-map parameter whose keys are
    // argument names with defaults. Lowers to an object pattern with a
    // `{}` default so the whole argument may be omitted.
    if let [sole] = elements {
        if sole.list_kind() == Some(ListKind::MapLiteral) {
            return Ok(vec![parse_json_map_param(ctx, sole)?]);
        }
    }

    let mut params = Vec::with_capacity(elements.len());
    let mut i = 0;
    while i < elements.len() {
        let element = &elements[i];
        if let Some(name) = element.symbol_name() {
            // `& rest` / `...rest`
            if name == "&" {
                let Some(rest) = elements.get(i + 1).and_then(|e| e.symbol_name()) else {
                    return Err(LowerError::validation(
                        "parameter list",
                        "a name after `&`",
                        "end of parameters",
                    )
                    .with_pos(element.pos.clone()));
                };
                params.push(Param {
                    pattern: Pattern::Rest {
                        name: sanitize_identifier(rest),
                    },
                    default: None,
                    type_annotation: None,
                });
                i += 2;
                continue;
            }
            if let Some(rest) = name.strip_prefix("...") {
                params.push(Param {
                    pattern: Pattern::Rest {
                        name: sanitize_identifier(rest),
                    },
                    default: None,
                    type_annotation: None,
                });
                i += 1;
                continue;
            }
            let (id, annotation) = split_type_annotation(name);
            params.push(Param {
                pattern: Pattern::Identifier {
                    name: sanitize_identifier(id),
                },
                default: None,
                type_annotation: annotation.map(str::to_string),
            });
            i += 1;
            continue;
        }

        if is_pattern_candidate(element) {
            params.push(Param {
                pattern: parse_pattern(ctx, element)?,
                default: None,
                type_annotation: None,
            });
            i += 1;
            continue;
        }

        // `(name default)`
        if let Some(pair) = element.list_children() {
            if pair.len() == 2 {
                let pattern = parse_pattern(ctx, &pair[0])?;
                let default = lower_value(ctx, &pair[1])?;
                params.push(Param {
                    pattern,
                    default: Some(default),
                    type_annotation: None,
                });
                i += 1;
                continue;
            }
        }

        return Err(LowerError::validation(
            "parameter list",
            "a name, pattern, `(name default)` or rest parameter",
            element.describe(),
        )
        .with_pos(element.pos.clone()));
    }
    Ok(params)
}

fn parse_json_map_param(ctx: &mut LowerCtx, map: &Expr) -> Result<Param, LowerError> {
    let entries = map.list_children().map(|c| &c[1..]).unwrap_or(&[]);
    if entries.len() % 2 != 0 {
        return Err(LowerError::validation(
            "parameter map",
            "name/default pairs",
            format!("{} forms", entries.len()),
        )
        .with_pos(map.pos.clone()));
    }
    let mut pattern_entries = Vec::with_capacity(entries.len() / 2);
    for pair in entries.chunks(2) {
        let Some(key) = pair[0].symbol_name() else {
            return Err(LowerError::validation(
                "parameter map",
                "a symbol argument name",
                pair[0].describe(),
            )
            .with_pos(pair[0].pos.clone()));
        };
        let (id, _) = split_type_annotation(key);
        let name = sanitize_identifier(id);
        let default = lower_value(ctx, &pair[1])?;
        pattern_entries.push(ObjectPatternEntry {
            key: id.to_string(),
            value: Pattern::Default {
                pattern: Box::new(Pattern::Identifier { name }),
                default: Box::new(default),
            },
        });
    }
    Ok(Param {
        pattern: Pattern::Object {
            entries: pattern_entries,
            rest: None,
        },
        default: Some(Node::new(
            NodeKind::ObjectExpression {
                properties: Vec::new(),
            },
            map.pos.clone(),
        )),
        type_annotation: None,
    })
}
