//! Imports and exports.

use hql_common::LowerError;
use hql_ir::{ExportSpecifier, ImportSpecifier, Node, NodeKind};
use hql_reader::{Expr, ExprKind, ListKind};

use crate::context::LowerCtx;
use crate::dispatch::{lower_expr, lower_value};
use crate::forms::form_args;
use crate::helpers::sanitize_identifier;
use crate::symbols::SymbolKind;

/// Compiled HQL modules import each other's compiled output: a relative
/// `.hql` source specifier is rewritten to `.js`. Bare specifiers
/// (packages) pass through untouched.
fn rewrite_source(source: &str) -> String {
    if (source.starts_with("./") || source.starts_with("../"))
        && source.ends_with(".hql")
    {
        format!("{}.js", &source[..source.len() - ".hql".len()])
    } else {
        source.to_string()
    }
}

/// The three import shapes: side-effect, namespace, and named-with-alias.
pub fn lower_import(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let (specifier, source_expr) = match args {
        // `(import "module")`
        [source] => (ImportSpecifier::SideEffect, source),
        // `(import name from "module")`
        [name, from, source] if from.is_symbol("from") => {
            let spec = match &name.kind {
                ExprKind::Symbol(name) => {
                    let local = sanitize_identifier(name);
                    ctx.symbols.declare(local.clone(), SymbolKind::Import);
                    ImportSpecifier::Namespace { name: local }
                }
                ExprKind::List {
                    children,
                    kind: ListKind::VectorLiteral,
                } => parse_named_imports(ctx, &children[1..])?,
                _ => {
                    return Err(LowerError::validation(
                        "import",
                        "a name or `[names...]` before `from`",
                        name.describe(),
                    )
                    .with_pos(name.pos.clone()));
                }
            };
            (spec, source)
        }
        _ => {
            return Err(LowerError::validation(
                "import",
                "`(import \"module\")` or `(import names from \"module\")`",
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
    };

    let Some(source) = source_expr.string_value() else {
        return Err(LowerError::validation(
            "import",
            "a string module specifier",
            source_expr.describe(),
        )
        .with_pos(source_expr.pos.clone()));
    };

    Ok(Node::new(
        NodeKind::ImportDeclaration {
            specifier,
            source: rewrite_source(source),
        },
        expr.pos.clone(),
    ))
}

/// `[n1 n2 (n3 as n4)]`.
fn parse_named_imports(
    ctx: &mut LowerCtx,
    items: &[Expr],
) -> Result<ImportSpecifier, LowerError> {
    let mut imports = Vec::with_capacity(items.len());
    for item in items {
        match &item.kind {
            ExprKind::Symbol(name) => {
                let local = sanitize_identifier(name);
                ctx.symbols.declare(local, SymbolKind::Import);
                imports.push((name.clone(), None));
            }
            ExprKind::List { children, .. } => {
                let (Some(imported), Some(as_kw), Some(alias)) =
                    (children.first(), children.get(1), children.get(2))
                else {
                    return Err(named_import_error(item));
                };
                if !as_kw.is_symbol("as") {
                    return Err(named_import_error(item));
                }
                let (Some(imported), Some(alias)) =
                    (imported.symbol_name(), alias.symbol_name())
                else {
                    return Err(named_import_error(item));
                };
                let local = sanitize_identifier(alias);
                ctx.symbols.declare(local, SymbolKind::Import);
                imports.push((imported.to_string(), Some(alias.to_string())));
            }
            ExprKind::Literal(_) => return Err(named_import_error(item)),
        }
    }
    Ok(ImportSpecifier::Named { imports })
}

fn named_import_error(item: &Expr) -> LowerError {
    LowerError::validation(
        "import",
        "a name or `(name as alias)`",
        item.describe(),
    )
    .with_pos(item.pos.clone())
}

/// `(import-dynamic "module")` — a dynamic import expression.
pub fn lower_dynamic_import(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let [source] = form_args(expr) else {
        return Err(LowerError::validation(
            "import-dynamic",
            "`(import-dynamic source)` with exactly one form",
            format!("{} forms", form_args(expr).len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let source_node = match source.string_value() {
        Some(literal) => Node::string(rewrite_source(literal), source.pos.clone()),
        None => lower_value(ctx, source)?,
    };
    Ok(Node::new(
        NodeKind::DynamicImport {
            source: Box::new(source_node),
        },
        expr.pos.clone(),
    ))
}

/// `(export [names...])` / `(export name)` / `(export default expr)` /
/// `(export (decl ...))`.
pub fn lower_export(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    match args {
        // `(export default expr)`
        [default_kw, value] if default_kw.is_symbol("default") => {
            let declaration = lower_value(ctx, value)?;
            Ok(Node::new(
                NodeKind::ExportDefaultDeclaration {
                    declaration: Box::new(declaration),
                },
                expr.pos.clone(),
            ))
        }
        // `(export name)`
        [name] if name.symbol_name().is_some() => {
            let local = name.symbol_name().unwrap_or_default();
            Ok(Node::new(
                NodeKind::ExportNamedDeclaration {
                    specifiers: vec![ExportSpecifier {
                        local: sanitize_identifier(local),
                        exported: None,
                    }],
                },
                expr.pos.clone(),
            ))
        }
        // `(export [n1 n2 ...])`
        [names]
            if names.list_kind() == Some(ListKind::VectorLiteral) =>
        {
            let items = names.list_children().map(|c| &c[1..]).unwrap_or(&[]);
            let mut specifiers = Vec::with_capacity(items.len());
            for item in items {
                match &item.kind {
                    ExprKind::Symbol(name) => specifiers.push(ExportSpecifier {
                        local: sanitize_identifier(name),
                        exported: None,
                    }),
                    ExprKind::List { children, .. }
                        if children.len() == 3 && children[1].is_symbol("as") =>
                    {
                        let (Some(local), Some(exported)) =
                            (children[0].symbol_name(), children[2].symbol_name())
                        else {
                            return Err(export_error(item));
                        };
                        specifiers.push(ExportSpecifier {
                            local: sanitize_identifier(local),
                            exported: Some(exported.to_string()),
                        });
                    }
                    _ => return Err(export_error(item)),
                }
            }
            Ok(Node::new(
                NodeKind::ExportNamedDeclaration { specifiers },
                expr.pos.clone(),
            ))
        }
        // `(export (decl ...))`
        [declaration] if declaration.list_kind() == Some(ListKind::Parens) => {
            let lowered = lower_expr(ctx, declaration)?;
            if lowered.is_expression() {
                return Err(LowerError::validation(
                    "export",
                    "a declaration form",
                    declaration.describe(),
                )
                .with_pos(declaration.pos.clone()));
            }
            Ok(Node::new(
                NodeKind::ExportVariableDeclaration {
                    declaration: Box::new(lowered),
                },
                expr.pos.clone(),
            ))
        }
        _ => Err(LowerError::validation(
            "export",
            "`(export [names])`, `(export name)`, `(export default expr)` or \
             `(export (decl ...))`",
            format!("{} forms", args.len()),
        )
        .with_pos(expr.pos.clone())),
    }
}

fn export_error(item: &Expr) -> LowerError {
    LowerError::validation(
        "export",
        "a name or `(name as alias)`",
        item.describe(),
    )
    .with_pos(item.pos.clone())
}
