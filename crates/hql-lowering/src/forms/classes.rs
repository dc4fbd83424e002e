//! `class` lowering.
//!
//! Recognized body elements: `var`/`let` fields (mutable/immutable),
//! `#name` private fields, `constructor`, `fn` methods, `static`
//! variants of all three, and `(getter ...)` / `(setter ...)`. Methods
//! and getters get an implicit return of their last expression; setters
//! do not.

use hql_common::LowerError;
use hql_ir::{
    ClassConstructor, ClassField, ClassMethod, MethodKind, Node, NodeKind,
};
use hql_reader::Expr;

use crate::body::lower_body_statements;
use crate::context::LowerCtx;
use crate::dispatch::lower_value;
use crate::forms::form_args;
use crate::forms::functions::parse_params;
use crate::helpers::{sanitize_identifier, split_type_annotation};
use crate::rewrite::early_return::wrap_function_body;
use crate::symbols::SymbolKind;

pub fn lower_class(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(name) = args.first().and_then(|n| n.symbol_name()) else {
        return Err(LowerError::validation(
            "class",
            "`(class Name body...)`",
            "no class name",
        )
        .with_pos(expr.pos.clone()));
    };
    ctx.symbols.declare(name.to_string(), SymbolKind::Class);

    let mut superclass = None;
    let mut fields = Vec::new();
    let mut constructor = None;
    let mut methods = Vec::new();

    let mut body = &args[1..];
    // `(extends Base)` immediately after the name.
    if let Some(first) = body.first() {
        if first.is_form("extends") {
            let children = first.list_children().unwrap_or(&[]);
            let Some(base) = children.get(1) else {
                return Err(LowerError::validation(
                    "class",
                    "`(extends Base)` with a base class",
                    "no base class",
                )
                .with_pos(first.pos.clone()));
            };
            superclass = Some(Box::new(lower_value(ctx, base)?));
            body = &body[1..];
        }
    }

    for element in body {
        lower_class_member(
            ctx,
            element,
            false,
            &mut fields,
            &mut constructor,
            &mut methods,
        )?;
    }

    Ok(Node::new(
        NodeKind::ClassDeclaration {
            id: name.to_string(),
            superclass,
            fields,
            constructor,
            methods,
        },
        expr.pos.clone(),
    ))
}

fn lower_class_member(
    ctx: &mut LowerCtx,
    element: &Expr,
    is_static: bool,
    fields: &mut Vec<ClassField>,
    constructor: &mut Option<ClassConstructor>,
    methods: &mut Vec<ClassMethod>,
) -> Result<(), LowerError> {
    let Some(children) = element.list_children() else {
        return Err(member_error(element));
    };
    let Some(head) = children.first().and_then(|h| h.symbol_name()) else {
        return Err(member_error(element));
    };

    match head {
        "static" if !is_static => {
            // `(static var ...)` / `(static fn ...)`: re-route the tail as
            // a member with the static bit set.
            let inner = Expr::list(children[1..].to_vec(), element.pos.clone());
            lower_class_member(ctx, &inner, true, fields, constructor, methods)
        }
        "var" | "let" => {
            let Some(name) = children.get(1).and_then(|n| n.symbol_name()) else {
                return Err(member_error(element));
            };
            let (id, _) = split_type_annotation(name);
            let value = children
                .get(2)
                .map(|v| lower_value(ctx, v))
                .transpose()?;
            fields.push(ClassField {
                name: field_name(id),
                value,
                mutable: head == "var",
                is_static,
                is_private: id.starts_with('#'),
            });
            Ok(())
        }
        name if name.starts_with('#') => {
            // `(#secret value?)` — private field shorthand.
            let value = children
                .get(1)
                .map(|v| lower_value(ctx, v))
                .transpose()?;
            fields.push(ClassField {
                name: name.to_string(),
                value,
                mutable: true,
                is_static,
                is_private: true,
            });
            Ok(())
        }
        "constructor" => {
            if constructor.is_some() {
                return Err(LowerError::validation(
                    "class",
                    "at most one constructor",
                    "a second constructor",
                )
                .with_pos(element.pos.clone()));
            }
            let Some(params_expr) = children.get(1) else {
                return Err(member_error(element));
            };
            let params = parse_params(ctx, params_expr)?;
            let body_forms = flatten_leading_do(&children[2..]);
            let statements =
                ctx.with_function_boundary(|ctx| lower_body_statements(ctx, body_forms, false))?;
            let body = wrap_function_body(Node::block(statements, element.pos.clone()));
            *constructor = Some(ClassConstructor {
                params,
                body: Box::new(body),
            });
            Ok(())
        }
        "fn" | "fn*" => {
            let is_generator = head == "fn*";
            let Some(name) = children.get(1).and_then(|n| n.symbol_name()) else {
                return Err(member_error(element));
            };
            let Some(params_expr) = children.get(2) else {
                return Err(member_error(element));
            };
            let params = parse_params(ctx, params_expr)?;
            let statements = ctx.with_function_boundary(|ctx| {
                lower_body_statements(ctx, &children[3..], true)
            })?;
            let body = wrap_function_body(Node::block(statements, element.pos.clone()));
            methods.push(ClassMethod {
                name: method_name(name),
                kind: MethodKind::Method,
                params,
                body: Box::new(body),
                is_static,
                is_async: false,
                is_generator,
            });
            Ok(())
        }
        "getter" | "setter" => {
            let kind = if head == "getter" {
                MethodKind::Getter
            } else {
                MethodKind::Setter
            };
            let Some(name) = children.get(1).and_then(|n| n.symbol_name()) else {
                return Err(member_error(element));
            };
            let Some(params_expr) = children.get(2) else {
                return Err(member_error(element));
            };
            let params = parse_params(ctx, params_expr)?;
            // Getters return their last expression; setters do not.
            let implicit_return = kind == MethodKind::Getter;
            let statements = ctx.with_function_boundary(|ctx| {
                lower_body_statements(ctx, &children[3..], implicit_return)
            })?;
            let body = wrap_function_body(Node::block(statements, element.pos.clone()));
            methods.push(ClassMethod {
                name: method_name(name),
                kind,
                params,
                body: Box::new(body),
                is_static,
                is_async: false,
                is_generator: false,
            });
            Ok(())
        }
        _ => Err(member_error(element)),
    }
}

fn member_error(element: &Expr) -> LowerError {
    LowerError::validation(
        "class body",
        "`var`/`let` fields, `#private` fields, `constructor`, `fn` methods, \
         `static` members, or getter/setter",
        element.describe(),
    )
    .with_pos(element.pos.clone())
}

fn field_name(name: &str) -> String {
    if let Some(private) = name.strip_prefix('#') {
        format!("#{}", sanitize_identifier(private))
    } else {
        sanitize_identifier(name)
    }
}

fn method_name(name: &str) -> String {
    sanitize_identifier(split_type_annotation(name).0)
}

/// A constructor body written as a single `(do ...)` block is flattened
/// into the statement list.
fn flatten_leading_do(body: &[Expr]) -> &[Expr] {
    match body {
        [sole] if sole.is_form("do") => sole
            .list_children()
            .map(|children| &children[1..])
            .unwrap_or(body),
        _ => body,
    }
}
