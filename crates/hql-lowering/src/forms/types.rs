//! `deftype` and `interface`: raw-body type declarations.
//!
//! Bodies are carried as raw strings, unvalidated, straight through to
//! the emitter. The generic parameter list is parsed from a
//! `Name<T, U>` spelling.

use hql_common::LowerError;
use hql_ir::{Node, NodeKind};
use hql_reader::Expr;

use crate::context::LowerCtx;
use crate::forms::form_args;

/// Split `Name<T, U>` into the base name and its type parameters.
fn parse_generic_name(raw: &str) -> (String, Vec<String>) {
    let Some(open) = raw.find('<') else {
        return (raw.trim().to_string(), Vec::new());
    };
    let name = raw[..open].trim().to_string();
    let inner = raw[open + 1..].trim_end_matches('>');
    let params = inner
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    (name, params)
}

fn name_of(expr: &Expr, form: &str) -> Result<String, LowerError> {
    expr.string_value()
        .map(str::to_string)
        .or_else(|| expr.symbol_name().map(str::to_string))
        .ok_or_else(|| {
            LowerError::validation(form, "a type name", expr.describe())
                .with_pos(expr.pos.clone())
        })
}

/// `(deftype Name "type expression")` — `Name` may carry `<T, U>`.
pub fn lower_deftype(_ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [name_expr, body_expr] = form_args(expr) else {
        return Err(LowerError::validation(
            "deftype",
            "`(deftype Name \"type\")` with exactly two forms",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let (id, type_parameters) = parse_generic_name(&name_of(name_expr, "deftype")?);
    let Some(body) = body_expr.string_value() else {
        return Err(LowerError::validation(
            "deftype",
            "a raw string type expression",
            body_expr.describe(),
        )
        .with_pos(body_expr.pos.clone()));
    };
    Ok(Node::new(
        NodeKind::TypeAliasDeclaration {
            id,
            type_parameters,
            body: body.to_string(),
        },
        expr.pos.clone(),
    ))
}

/// `(interface Name (extends A B)? "body")`.
pub fn lower_interface(_ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let (name_expr, extends_expr, body_expr) = match args {
        [name, body] => (name, None, body),
        [name, extends, body] if extends.is_form("extends") => (name, Some(extends), body),
        _ => {
            return Err(LowerError::validation(
                "interface",
                "`(interface Name (extends ...)? \"body\")`",
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
    };

    let (id, type_parameters) = parse_generic_name(&name_of(name_expr, "interface")?);
    let extends = match extends_expr {
        None => Vec::new(),
        Some(form) => {
            let children = form.list_children().unwrap_or(&[]);
            let mut bases = Vec::with_capacity(children.len().saturating_sub(1));
            for base in &children[1..] {
                let Some(base_name) = base.symbol_name().or_else(|| base.string_value()) else {
                    return Err(LowerError::validation(
                        "interface",
                        "base interface names",
                        base.describe(),
                    )
                    .with_pos(base.pos.clone()));
                };
                bases.push(base_name.to_string());
            }
            bases
        }
    };

    let Some(body) = body_expr.string_value() else {
        return Err(LowerError::validation(
            "interface",
            "a raw string body",
            body_expr.describe(),
        )
        .with_pos(body_expr.pos.clone()));
    };

    Ok(Node::new(
        NodeKind::InterfaceDeclaration {
            id,
            type_parameters,
            extends,
            body: body.to_string(),
        },
        expr.pos.clone(),
    ))
}
