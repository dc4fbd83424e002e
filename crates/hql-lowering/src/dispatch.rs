//! The central AST→IR router.
//!
//! `lower_expr` handles literals and symbols itself and sends lists to
//! the form table; a form lowering may decline (return `None`), in which
//! case the list is treated as a standard function call, subject to the
//! call-vs-access disambiguation for two-element lists.

use hql_common::{LowerError, Position};
use hql_ir::{Node, NodeKind, Program};
use hql_reader::{Expr, ExprKind, Literal};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::context::LowerCtx;
use crate::forms;
use crate::helpers::{HELPER_GET, HELPER_GET_NUMERIC, HELPER_GET_OP, sanitize_identifier};

/// Lower a whole program. The first failing top-level form aborts
/// lowering; sibling forms are not attempted.
pub fn lower_program(ast: &[Expr], current_dir: &str) -> Result<Program, LowerError> {
    let mut ctx = LowerCtx::new(current_dir);
    forms::predeclare(&mut ctx, ast);
    let mut body = Vec::with_capacity(ast.len());
    for form in ast {
        let node = lower_expr(&mut ctx, form)?;
        body.push(ensure_statement(node));
    }
    Ok(Program { body })
}

/// Wrap expression nodes in `ExpressionStatement`; statements and
/// declarations pass through. The classification comes from the single
/// canonical predicate.
#[must_use]
pub fn ensure_statement(node: Node) -> Node {
    if node.is_expression() {
        let pos = node.pos.clone();
        Node::expr_stmt(node, pos)
    } else {
        node
    }
}

/// Lower one AST node to one IR node.
pub fn lower_expr(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    ctx.enter_expr(&expr.pos)?;
    let result = match &expr.kind {
        ExprKind::Literal(literal) => Ok(lower_literal(literal, expr.pos.clone())),
        ExprKind::Symbol(name) => lower_symbol(ctx, name, expr.pos.clone()),
        ExprKind::List { children, .. } => lower_list(ctx, expr, children),
    };
    ctx.exit_expr();
    result
}

/// Lower in value position: named function declarations become named
/// function expressions so they can sit in expression slots.
pub fn lower_value(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    Ok(as_expression(lower_expr(ctx, expr)?))
}

/// Convert declaration-shaped nodes to their expression form where one
/// exists.
#[must_use]
pub fn as_expression(node: Node) -> Node {
    match node.kind {
        NodeKind::FunctionDeclaration {
            id,
            params,
            body,
            is_async,
            is_generator,
        }
        | NodeKind::FnFunctionDeclaration {
            id,
            params,
            body,
            is_async,
            is_generator,
        } => Node::new(
            NodeKind::FunctionExpression {
                id: Some(id),
                params,
                body,
                is_async,
                is_generator,
            },
            node.pos,
        ),
        kind => Node::new(kind, node.pos),
    }
}

fn lower_literal(literal: &Literal, pos: Position) -> Node {
    match literal {
        Literal::Null => Node::null(pos),
        Literal::Bool(b) => Node::boolean(*b, pos),
        Literal::Number(n) => Node::number(*n, pos),
        Literal::BigInt(raw) => Node::new(
            NodeKind::BigIntLiteral {
                value: raw.clone(),
            },
            pos,
        ),
        Literal::Str(s) => Node::string(s.clone(), pos),
    }
}

/// The first-class operator table.
static OPERATOR_SYMBOLS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "+", "-", "*", "/", "%", "**", "===", "==", "!==", "!=", "<", ">", "<=", ">=",
        "&&", "||", "!", "~", "&", "|", "^", "<<", ">>", ">>>",
    ]
    .into_iter()
    .collect()
});

/// Whether a symbol names a first-class operator.
#[must_use]
pub fn is_operator_symbol(name: &str) -> bool {
    OPERATOR_SYMBOLS.contains(name)
}

fn lower_symbol(ctx: &mut LowerCtx, name: &str, pos: Position) -> Result<Node, LowerError> {
    // `_` in expression position is the literal string "_".
    if name == "_" {
        return Ok(Node::string("_", pos));
    }

    // A bare operator reference reifies through the runtime helper, so
    // `(map + ...)` gets a real function value.
    if is_operator_symbol(name) {
        return Ok(Node::helper_call(
            HELPER_GET_OP,
            vec![Node::string(name, pos.clone())],
            pos,
        ));
    }

    // `js/` prefix: raw identifier passthrough (hyphens become
    // underscores, nothing else changes).
    if let Some(raw) = name.strip_prefix("js/") {
        return Ok(Node::identifier(raw.replace('-', "_"), pos));
    }

    // Optional chains keep the optional bit on the exact step that was
    // written `?.`.
    if name.contains("?.") {
        return Ok(lower_optional_chain(name, pos));
    }

    // Dot-paths become a guarded-access node: the emitter turns them into
    // a null-safe accessor IIFE.
    if name.contains('.') && !name.starts_with('.') && !name.starts_with("...") {
        let mut segments = name.split('.');
        let base = segments.next().unwrap_or_default();
        let path: Vec<String> = segments.map(str::to_string).collect();
        return Ok(Node::new(
            NodeKind::InteropIIFE {
                object: Box::new(Node::identifier(sanitize_identifier(base), pos.clone())),
                property_path: path,
            },
            pos,
        ));
    }

    Ok(Node::identifier(sanitize_identifier(name), pos))
}

/// Build the mixed member/optional-member chain for `a?.b.c?.d`.
fn lower_optional_chain(name: &str, pos: Position) -> Node {
    // Splitting on '.' leaves a '?' suffix on segments that were followed
    // by `?.`; the optional bit belongs to the *next* access step.
    let segments: Vec<&str> = name.split('.').collect();
    let base = segments[0];
    let base_optional = base.ends_with('?');
    let mut chain = Node::identifier(
        sanitize_identifier(base.trim_end_matches('?')),
        pos.clone(),
    );
    let mut optional = base_optional;
    for segment in &segments[1..] {
        let this_optional = optional;
        optional = segment.ends_with('?');
        let property = Node::identifier(segment.trim_end_matches('?'), pos.clone());
        let kind = if this_optional {
            NodeKind::OptionalMemberExpression {
                object: Box::new(chain),
                property: Box::new(property),
                computed: false,
            }
        } else {
            NodeKind::MemberExpression {
                object: Box::new(chain),
                property: Box::new(property),
                computed: false,
            }
        };
        chain = Node::new(kind, pos.clone());
    }
    chain
}

fn lower_list(ctx: &mut LowerCtx, expr: &Expr, children: &[Expr]) -> Result<Node, LowerError> {
    // An empty list is an empty array expression.
    let Some(head) = children.first() else {
        return Ok(Node::new(
            NodeKind::ArrayExpression { elements: vec![] },
            expr.pos.clone(),
        ));
    };
    let args = &children[1..];

    if let Some(head_name) = head.symbol_name() {
        // `(.method obj args...)`
        if head_name.starts_with('.') && head_name.len() > 1 && !head_name.starts_with("...") {
            return lower_dot_method(ctx, expr, head_name, args);
        }

        // Special forms.
        if let Some(node) = forms::lower_form(ctx, head_name, expr)? {
            trace!(form = head_name, "lowered special form");
            return Ok(node);
        }

        // Call-vs-access disambiguation for `(sym arg)`.
        if args.len() == 1 && !ctx.symbols.is_callable(head_name) {
            let object_pos = head.pos.clone();
            if let Some(key) = args[0].string_value() {
                let object = lower_value(ctx, head)?;
                return Ok(Node::helper_call(
                    HELPER_GET,
                    vec![object, Node::string(key, object_pos)],
                    expr.pos.clone(),
                ));
            }
            if let Some(index) = args[0].number_value() {
                let object = lower_value(ctx, head)?;
                return Ok(Node::helper_call(
                    HELPER_GET_NUMERIC,
                    vec![object, Node::number(index, object_pos)],
                    expr.pos.clone(),
                ));
            }
        }

        // Standard function call.
        let callee = lower_value(ctx, head)?;
        let arguments = lower_call_args(ctx, args)?;
        return Ok(Node::call(callee, arguments, expr.pos.clone()));
    }

    // Nested-list head: lower the head, then apply the same single-access
    // rules before falling back to a call.
    if head.list_children().is_some() {
        let callee = lower_value(ctx, head)?;
        if args.len() == 1 {
            if let Some(key) = args[0].string_value() {
                return Ok(Node::helper_call(
                    HELPER_GET,
                    vec![callee, Node::string(key, args[0].pos.clone())],
                    expr.pos.clone(),
                ));
            }
            if let Some(index) = args[0].number_value() {
                return Ok(Node::helper_call(
                    HELPER_GET_NUMERIC,
                    vec![callee, Node::number(index, args[0].pos.clone())],
                    expr.pos.clone(),
                ));
            }
        }
        let arguments = lower_call_args(ctx, args)?;
        return Ok(Node::call(callee, arguments, expr.pos.clone()));
    }

    // A literal in head position is a call to a non-function; let it lower
    // as a plain call so the error surfaces at runtime like any JS call.
    let callee = lower_value(ctx, head)?;
    let arguments = lower_call_args(ctx, args)?;
    Ok(Node::call(callee, arguments, expr.pos.clone()))
}

fn lower_dot_method(
    ctx: &mut LowerCtx,
    expr: &Expr,
    head_name: &str,
    args: &[Expr],
) -> Result<Node, LowerError> {
    let method = &head_name[1..];
    let Some(receiver) = args.first() else {
        return Err(LowerError::validation(
            "method call",
            format!("`(.{method} obj args...)` with a receiver"),
            "no receiver",
        )
        .with_pos(expr.pos.clone()));
    };
    let object = lower_value(ctx, receiver)?;
    let callee = Node::member(
        object,
        Node::identifier(method, expr.pos.clone()),
        false,
        expr.pos.clone(),
    );
    let arguments = lower_call_args(ctx, &args[1..])?;
    Ok(Node::call(callee, arguments, expr.pos.clone()))
}

/// Lower call arguments with uniform spread detection: `...sym` and
/// `(... expr)` both become `SpreadElement`.
pub fn lower_call_args(ctx: &mut LowerCtx, args: &[Expr]) -> Result<Vec<Node>, LowerError> {
    args.iter().map(|arg| lower_element(ctx, arg)).collect()
}

/// Lower one array/call-position element, detecting spread forms.
pub fn lower_element(ctx: &mut LowerCtx, arg: &Expr) -> Result<Node, LowerError> {
    if let Some(spread) = spread_argument(arg) {
        let argument = match spread {
            SpreadSource::Symbol(name) => {
                lower_symbol(ctx, name, arg.pos.clone())?
            }
            SpreadSource::Expr(inner) => lower_value(ctx, inner)?,
        };
        return Ok(Node::new(
            NodeKind::SpreadElement {
                argument: Box::new(argument),
            },
            arg.pos.clone(),
        ));
    }
    lower_value(ctx, arg)
}

pub enum SpreadSource<'a> {
    Symbol(&'a str),
    Expr(&'a Expr),
}

/// Detect the two spread spellings.
#[must_use]
pub fn spread_argument(arg: &Expr) -> Option<SpreadSource<'_>> {
    if let Some(name) = arg.symbol_name() {
        if let Some(rest) = name.strip_prefix("...") {
            if !rest.is_empty() {
                return Some(SpreadSource::Symbol(rest));
            }
        }
        return None;
    }
    let children = arg.list_children()?;
    match children {
        [head, inner] if head.is_symbol("...") => Some(SpreadSource::Expr(inner)),
        _ => None,
    }
}
