//! Special-form lowerings, one module per form family.
//!
//! `lower_form` is the static operator table consulted by the dispatch
//! router. A `None` return means "not a special form here" and the router
//! falls back to the standard function-call path.

pub mod bindings;
pub mod classes;
pub mod conditionals;
pub mod data;
pub mod enums;
pub mod functions;
pub mod interop;
pub mod loops;
pub mod modules;
pub mod primitives;
pub mod quotes;
pub mod templates;
pub mod trycatch;
pub mod types;

use hql_common::LowerError;
use hql_ir::Node;
use hql_reader::{Expr, ExprKind};

use crate::context::LowerCtx;
use crate::symbols::SymbolKind;

/// Route a list form by its head symbol.
pub fn lower_form(
    ctx: &mut LowerCtx,
    name: &str,
    expr: &Expr,
) -> Result<Option<Node>, LowerError> {
    let node = match name {
        "quote" => quotes::lower_quote(ctx, expr)?,
        "quasiquote" => quotes::lower_quasiquote(ctx, expr)?,
        "unquote" | "unquote-splicing" => {
            return Err(LowerError::validation(
                name,
                "an enclosing quasiquote",
                "a bare unquote form",
            )
            .with_pos(expr.pos.clone()));
        }

        "vector" => data::lower_vector(ctx, expr)?,
        "hash-map" => data::lower_hash_map(ctx, expr)?,
        "hash-set" => data::lower_hash_set(ctx, expr)?,
        "new" | "js-new" => data::lower_new(ctx, expr)?,

        "const" | "def" => bindings::lower_binding(ctx, expr, hql_ir::DeclarationKind::Const)?,
        "let" => bindings::lower_binding(ctx, expr, hql_ir::DeclarationKind::Let)?,
        "var" => bindings::lower_binding(ctx, expr, hql_ir::DeclarationKind::Var)?,

        "if" => conditionals::lower_if(ctx, expr)?,
        "?" => conditionals::lower_ternary(ctx, expr)?,
        "do" => conditionals::lower_do(ctx, expr)?,
        "return" => conditionals::lower_return(ctx, expr)?,
        "throw" => conditionals::lower_throw(ctx, expr)?,
        "switch" => conditionals::lower_switch(ctx, expr)?,

        "try" => trycatch::lower_try(ctx, expr)?,

        "fn" => functions::lower_fn(ctx, expr, false, false)?,
        "fn*" => functions::lower_fn(ctx, expr, false, true)?,
        "=>" => functions::lower_arrow(ctx, expr)?,
        "async" => functions::lower_async(ctx, expr)?,
        "await" => functions::lower_await(ctx, expr)?,
        "yield" => functions::lower_yield(ctx, expr, false)?,
        "yield*" => functions::lower_yield(ctx, expr, true)?,

        "class" => classes::lower_class(ctx, expr)?,
        "enum" => enums::lower_enum(ctx, expr)?,

        "loop" => loops::lower_loop(ctx, expr)?,
        "recur" => {
            return Err(LowerError::validation(
                "recur",
                "tail position inside a loop",
                "recur outside any loop tail",
            )
            .with_pos(expr.pos.clone()));
        }
        "while" => loops::lower_while(ctx, expr)?,
        "for-of" => loops::lower_for_of(ctx, expr, false)?,
        "for-await-of" => loops::lower_for_of(ctx, expr, true)?,
        "label" => loops::lower_label(ctx, expr)?,
        "break" => loops::lower_break(ctx, expr)?,
        "continue" => loops::lower_continue(ctx, expr)?,

        "import" => modules::lower_import(ctx, expr)?,
        "import-dynamic" => modules::lower_dynamic_import(ctx, expr)?,
        "export" => modules::lower_export(ctx, expr)?,

        "js-get" => interop::lower_js_get(ctx, expr)?,
        "js-set" => interop::lower_js_set(ctx, expr)?,
        "js-call" => interop::lower_js_call(ctx, expr)?,
        "js-method" => interop::lower_js_method(ctx, expr)?,
        "js-get-invoke" => interop::lower_js_get_invoke(ctx, expr)?,

        "template-literal" => templates::lower_template(ctx, expr)?,

        "deftype" => types::lower_deftype(ctx, expr)?,
        "interface" => types::lower_interface(ctx, expr)?,

        "=" => primitives::lower_assignment(ctx, expr)?,
        op if crate::dispatch::is_operator_symbol(op) => {
            primitives::lower_operator_call(ctx, op, expr)?
        }

        _ => return Ok(None),
    };
    Ok(Some(node))
}

/// Positional arguments of a form (everything after the head symbol).
pub(crate) fn form_args(expr: &Expr) -> &[Expr] {
    expr.list_children()
        .map(|children| &children[1..])
        .unwrap_or(&[])
}

/// Pre-register top-level declarations so that call-vs-access decisions
/// see forward references. The table is a hint, so this pass is lossy by
/// design: only unambiguous head/name shapes register.
pub fn predeclare(ctx: &mut LowerCtx, ast: &[Expr]) {
    for form in ast {
        let Some(children) = form.list_children() else {
            continue;
        };
        let (Some(head), Some(name_expr)) = (children.first(), children.get(1)) else {
            continue;
        };
        let Some(head_name) = head.symbol_name() else {
            continue;
        };
        match head_name {
            "fn" | "fn*" => {
                if let Some(name) = name_expr.symbol_name() {
                    ctx.symbols.declare(
                        crate::helpers::sanitize_identifier(name),
                        SymbolKind::Fn,
                    );
                }
            }
            "const" | "def" | "let" | "var" => {
                if let Some(name) = name_expr.symbol_name() {
                    let (id, _) = crate::helpers::split_type_annotation(name);
                    // A binding whose initializer is a fn form is callable.
                    let kind = match children.get(2).map(|init| init.is_form("fn")
                        || init.is_form("fn*")
                        || init.is_form("=>")
                        || init.is_form("async"))
                    {
                        Some(true) => SymbolKind::Function,
                        _ => SymbolKind::Variable,
                    };
                    ctx.symbols
                        .declare(crate::helpers::sanitize_identifier(id), kind);
                }
            }
            "class" => {
                if let Some(name) = name_expr.symbol_name() {
                    ctx.symbols.declare(name.to_string(), SymbolKind::Class);
                }
            }
            "enum" => {
                if let Some(name) = name_expr.symbol_name() {
                    let (id, _) = crate::helpers::split_type_annotation(name);
                    ctx.symbols.declare(id.to_string(), SymbolKind::Enum);
                }
            }
            "import" => {
                match &name_expr.kind {
                    // `(import name from "m")`
                    ExprKind::Symbol(name) => {
                        ctx.symbols.declare(
                            crate::helpers::sanitize_identifier(name),
                            SymbolKind::Import,
                        );
                    }
                    // `(import [a b (c as d)] from "m")`
                    ExprKind::List { children, .. } => {
                        for item in children.iter().skip(1) {
                            let local = match &item.kind {
                                ExprKind::Symbol(n) => Some(n.clone()),
                                ExprKind::List { children, .. } => children
                                    .get(2)
                                    .and_then(|alias| alias.symbol_name())
                                    .map(str::to_string),
                                ExprKind::Literal(_) => None,
                            };
                            if let Some(local) = local {
                                ctx.symbols.declare(
                                    crate::helpers::sanitize_identifier(&local),
                                    SymbolKind::Import,
                                );
                            }
                        }
                    }
                    ExprKind::Literal(_) => {}
                }
            }
            _ => {}
        }
    }
}
