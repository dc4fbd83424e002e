//! `enum` lowering.

use hql_common::LowerError;
use hql_ir::{EnumCase, Node, NodeKind};
use hql_reader::{Expr, ExprKind, Literal};

use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;
use crate::helpers::split_type_annotation;
use crate::symbols::SymbolKind;

/// `(enum Name[:RawType] (case c1 ...) ...)`.
///
/// Three case shapes: bare `(case c)`, raw value `(case c 200)`, and
/// associated value names `(case c a b)`. The declaration records
/// whether any case carries associated values.
pub fn lower_enum(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(name) = args.first().and_then(|n| n.symbol_name()) else {
        return Err(LowerError::validation(
            "enum",
            "`(enum Name (case ...)...)`",
            "no enum name",
        )
        .with_pos(expr.pos.clone()));
    };
    let (id, raw_type) = split_type_annotation(name);
    ctx.symbols.declare(id.to_string(), SymbolKind::Enum);

    let mut cases = Vec::with_capacity(args.len() - 1);
    let mut has_associated_values = false;
    for case_form in &args[1..] {
        let Some(children) = case_form.list_children() else {
            return Err(case_error(case_form));
        };
        if !children.first().is_some_and(|h| h.is_symbol("case")) {
            return Err(case_error(case_form));
        }
        let Some(case_name) = children.get(1).and_then(|n| n.symbol_name()) else {
            return Err(case_error(case_form));
        };

        let case = match &children[2..] {
            [] => EnumCase {
                name: case_name.to_string(),
                raw_value: None,
                associated_values: None,
            },
            // A single literal is a raw value.
            [raw] if matches!(
                raw.kind,
                ExprKind::Literal(
                    Literal::Number(_) | Literal::Str(_) | Literal::Bool(_)
                )
            ) =>
            {
                EnumCase {
                    name: case_name.to_string(),
                    raw_value: Some(lower_value(ctx, raw)?),
                    associated_values: None,
                }
            }
            // Symbols name a positional payload.
            payload => {
                let mut names = Vec::with_capacity(payload.len());
                for value in payload {
                    let Some(value_name) = value.symbol_name() else {
                        return Err(LowerError::validation(
                            "enum case",
                            "associated value names as symbols",
                            value.describe(),
                        )
                        .with_pos(value.pos.clone()));
                    };
                    names.push(value_name.to_string());
                }
                has_associated_values = true;
                EnumCase {
                    name: case_name.to_string(),
                    raw_value: None,
                    associated_values: Some(names),
                }
            }
        };
        cases.push(case);
    }

    Ok(Node::new(
        NodeKind::EnumDeclaration {
            id: id.to_string(),
            raw_type: raw_type.map(str::to_string),
            cases,
            has_associated_values,
        },
        expr.pos.clone(),
    ))
}

fn case_error(case_form: &Expr) -> LowerError {
    LowerError::validation(
        "enum",
        "`(case name)` / `(case name raw)` / `(case name payload...)`",
        case_form.describe(),
    )
    .with_pos(case_form.pos.clone())
}
