//! Destructuring pattern detection and parsing.
//!
//! `[a b]` and `(vector a b)` read to the same list shape; only the
//! provenance bit tells them apart. In binding position a vector-literal
//! list is an array pattern and a map-literal list is an object pattern;
//! the `vector`/`hash-map` head symbol is stripped only *after* that
//! decision, so non-pattern lists keep their head for the data-structure
//! lowering.

use hql_common::LowerError;
use hql_ir::{ObjectPatternEntry, Pattern};
use hql_reader::{Expr, ExprKind, ListKind};

use crate::dispatch::lower_expr;
use crate::helpers::{sanitize_identifier, split_type_annotation};
use crate::LowerCtx;

/// Whether `expr` can sit in binding position as a destructuring pattern.
#[must_use]
pub fn is_pattern_candidate(expr: &Expr) -> bool {
    matches!(
        expr.list_kind(),
        Some(ListKind::VectorLiteral | ListKind::MapLiteral)
    )
}

/// Whether a symbol marks "consume the remainder".
fn is_rest_marker(name: &str) -> bool {
    name == "&" || name == "..."
}

fn binding_name(name: &str) -> String {
    let (id, _) = split_type_annotation(name);
    sanitize_identifier(id)
}

/// Parse a binding-position expression into a pattern tree.
///
/// Bare symbols are identifiers, `_` skips, vector-literals become array
/// patterns, map-literals become object patterns, and a two-element
/// `(name default)` list attaches a default. Patterns nest freely.
pub fn parse_pattern(ctx: &mut LowerCtx, expr: &Expr) -> Result<Pattern, LowerError> {
    match &expr.kind {
        ExprKind::Symbol(name) if name == "_" => Ok(Pattern::Skip),
        ExprKind::Symbol(name) => {
            if is_rest_marker(name) {
                return Err(LowerError::validation(
                    "destructuring pattern",
                    "a binding after the rest marker",
                    "a bare rest marker",
                )
                .with_pos(expr.pos.clone()));
            }
            if let Some(rest_name) = name.strip_prefix("...") {
                return Ok(Pattern::Rest {
                    name: binding_name(rest_name),
                });
            }
            Ok(Pattern::Identifier {
                name: binding_name(name),
            })
        }
        ExprKind::List { children, kind } => match kind {
            ListKind::VectorLiteral => parse_array_pattern(ctx, &children[1..], &expr.pos),
            ListKind::MapLiteral => parse_object_pattern(ctx, &children[1..], &expr.pos),
            ListKind::Parens => parse_default_pattern(ctx, children, expr),
        },
        ExprKind::Literal(_) => Err(LowerError::validation(
            "destructuring pattern",
            "a symbol, vector pattern or map pattern",
            expr.describe(),
        )
        .with_pos(expr.pos.clone())),
    }
}

/// `(name default)` — a pattern with a fallback expression.
fn parse_default_pattern(
    ctx: &mut LowerCtx,
    children: &[Expr],
    expr: &Expr,
) -> Result<Pattern, LowerError> {
    if children.len() != 2 {
        return Err(LowerError::validation(
            "destructuring pattern",
            "`(binding default)` with exactly two forms",
            format!("{} forms", children.len()),
        )
        .with_pos(expr.pos.clone()));
    }
    let pattern = parse_pattern(ctx, &children[0])?;
    if matches!(pattern, Pattern::Rest { .. } | Pattern::Skip) {
        return Err(LowerError::validation(
            "destructuring pattern",
            "a named binding before a default",
            children[0].describe(),
        )
        .with_pos(children[0].pos.clone()));
    }
    let default = lower_expr(ctx, &children[1])?;
    Ok(Pattern::Default {
        pattern: Box::new(pattern),
        default: Box::new(default),
    })
}

fn parse_array_pattern(
    ctx: &mut LowerCtx,
    elements: &[Expr],
    pos: &hql_common::Position,
) -> Result<Pattern, LowerError> {
    let mut parsed = Vec::with_capacity(elements.len());
    let mut saw_rest = false;
    let mut i = 0;
    while i < elements.len() {
        let element = &elements[i];
        let is_marker = element.symbol_name().is_some_and(is_rest_marker);
        let is_inline_rest = element
            .symbol_name()
            .is_some_and(|n| n.starts_with("...") && n.len() > 3);

        if is_marker || is_inline_rest {
            if saw_rest {
                return Err(LowerError::validation(
                    "array pattern",
                    "at most one rest binding",
                    "a second rest binding",
                )
                .with_pos(element.pos.clone()));
            }
            let (rest_name, consumed) = if is_marker {
                let Some(next) = elements.get(i + 1) else {
                    return Err(LowerError::validation(
                        "array pattern",
                        "a name after the rest marker",
                        "end of pattern",
                    )
                    .with_pos(element.pos.clone()));
                };
                let Some(name) = next.symbol_name() else {
                    return Err(LowerError::validation(
                        "array pattern",
                        "a symbol in the rest slot",
                        next.describe(),
                    )
                    .with_pos(next.pos.clone()));
                };
                (name.to_string(), 2)
            } else {
                let name = element.symbol_name().unwrap_or_default();
                (name["...".len()..].to_string(), 1)
            };
            if i + consumed != elements.len() {
                return Err(LowerError::validation(
                    "array pattern",
                    "the rest binding in final position",
                    "elements after the rest binding",
                )
                .with_pos(element.pos.clone()));
            }
            parsed.push(Pattern::Rest {
                name: binding_name(&rest_name),
            });
            saw_rest = true;
            i += consumed;
            continue;
        }

        parsed.push(parse_pattern(ctx, element)?);
        i += 1;
    }
    if parsed.is_empty() {
        return Err(LowerError::validation(
            "array pattern",
            "at least one binding",
            "an empty pattern",
        )
        .with_pos(pos.clone()));
    }
    Ok(Pattern::Array { elements: parsed })
}

fn parse_object_pattern(
    ctx: &mut LowerCtx,
    elements: &[Expr],
    pos: &hql_common::Position,
) -> Result<Pattern, LowerError> {
    let mut entries = Vec::new();
    let mut rest: Option<String> = None;
    let mut i = 0;
    while i < elements.len() {
        let element = &elements[i];
        if element.symbol_name().is_some_and(is_rest_marker) {
            if rest.is_some() {
                return Err(LowerError::validation(
                    "object pattern",
                    "at most one rest binding",
                    "a second rest binding",
                )
                .with_pos(element.pos.clone()));
            }
            let Some(next) = elements.get(i + 1) else {
                return Err(LowerError::validation(
                    "object pattern",
                    "a name after the rest marker",
                    "end of pattern",
                )
                .with_pos(element.pos.clone()));
            };
            let Some(name) = next.symbol_name() else {
                return Err(LowerError::validation(
                    "object pattern",
                    "a symbol in the rest slot",
                    next.describe(),
                )
                .with_pos(next.pos.clone()));
            };
            rest = Some(binding_name(name));
            i += 2;
            continue;
        }

        let Some(key) = element.symbol_name() else {
            return Err(LowerError::validation(
                "object pattern",
                "a property key symbol",
                element.describe(),
            )
            .with_pos(element.pos.clone()));
        };
        let Some(binding) = elements.get(i + 1) else {
            return Err(LowerError::validation(
                "object pattern",
                "a binding after each property key",
                format!("dangling key `{key}`"),
            )
            .with_pos(element.pos.clone()));
        };
        let (key_name, _) = split_type_annotation(key);
        entries.push(ObjectPatternEntry {
            key: key_name.to_string(),
            value: parse_pattern(ctx, binding)?,
        });
        i += 2;
    }
    if entries.is_empty() && rest.is_none() {
        return Err(LowerError::validation(
            "object pattern",
            "at least one binding",
            "an empty pattern",
        )
        .with_pos(pos.clone()));
    }
    Ok(Pattern::Object { entries, rest })
}
