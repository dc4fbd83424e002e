//! `loop` / `recur`, the native-`while` optimizer, `while`, `for-of`,
//! `for-await-of`, and `label` / `break` / `continue`.
//!
//! The general `loop` lowering is a self-referencing IIFE: bindings
//! become parameters of a named inner function and tail `recur` becomes a
//! call back to it. When the body matches the restricted
//! `(if test <recur-branch> <value-branch>)` shape, the optimizer emits a
//! native `while` with compound-assignment updates instead.

use hql_common::LowerError;
use hql_ir::{
    AssignOp, DeclarationKind, Node, NodeKind, Param, Pattern, UnaryOp, UpdateOp,
    VariableDeclarator,
};
use hql_reader::{Expr, ExprKind, ListKind};
use tracing::debug;

use crate::body::{iife_expression, returned};
use crate::context::{LoopFrame, LowerCtx};
use crate::dispatch::{ensure_statement, lower_call_args, lower_expr, lower_value};
use crate::forms::form_args;
use crate::helpers::{TEMP_PREFIX, sanitize_identifier, split_type_annotation};
use crate::patterns::parse_pattern;
use crate::rewrite::labels::{
    ast_for_of_targets_label, ast_has_labeled_jump, ast_targets_label,
};

/// One loop binding: parameter name plus its initial-value form.
struct LoopBinding<'a> {
    name: String,
    init: &'a Expr,
}

fn parse_loop_bindings<'a>(
    container: &'a Expr,
    context: &str,
) -> Result<Vec<LoopBinding<'a>>, LowerError> {
    let elements: &[Expr] = match &container.kind {
        ExprKind::List { children, kind } => match kind {
            ListKind::VectorLiteral => &children[1..],
            ListKind::Parens => children,
            ListKind::MapLiteral => {
                return Err(LowerError::validation(
                    context,
                    "`[name init ...]` bindings",
                    "a map literal",
                )
                .with_pos(container.pos.clone()));
            }
        },
        _ => {
            return Err(LowerError::validation(
                context,
                "`[name init ...]` bindings",
                container.describe(),
            )
            .with_pos(container.pos.clone()));
        }
    };
    if elements.len() % 2 != 0 {
        return Err(LowerError::validation(
            context,
            "name/init pairs",
            format!("{} forms", elements.len()),
        )
        .with_pos(container.pos.clone()));
    }
    elements
        .chunks(2)
        .map(|pair| {
            let Some(name) = pair[0].symbol_name() else {
                return Err(LowerError::validation(
                    context,
                    "a symbol binding name",
                    pair[0].describe(),
                )
                .with_pos(pair[0].pos.clone()));
            };
            Ok(LoopBinding {
                name: sanitize_identifier(split_type_annotation(name).0),
                init: &pair[1],
            })
        })
        .collect()
}

/// Whether the subtree contains a `(recur ...)` belonging to *this* loop
/// (nested loops and functions own their own recur).
fn contains_recur(expr: &Expr) -> bool {
    if expr.is_form("recur") {
        return true;
    }
    if expr.is_form("fn") || expr.is_form("fn*") || expr.is_form("=>") || expr.is_form("loop") {
        return false;
    }
    expr.list_children()
        .is_some_and(|children| children.iter().any(contains_recur))
}

pub fn lower_loop(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(container) = args.first() else {
        return Err(LowerError::validation(
            "loop",
            "`(loop [bindings] body...)`",
            "no bindings",
        )
        .with_pos(expr.pos.clone()));
    };
    let bindings = parse_loop_bindings(container, "loop")?;
    let body = &args[1..];
    if body.is_empty() {
        return Err(LowerError::validation(
            "loop",
            "a non-empty loop body",
            "no body",
        )
        .with_pos(expr.pos.clone()));
    }

    // Optimizer: a single `(if ...)` body in the restricted shape lowers
    // to a native while loop.
    if let [sole] = body {
        if let Some(node) = try_optimize_while(ctx, expr, &bindings, sole)? {
            debug!("loop optimizer produced native while");
            return Ok(node);
        }
    }
    debug!("loop optimizer declined, using self-referencing IIFE");

    lower_loop_general(ctx, expr, &bindings, body)
}

// =============================================================================
// General case: self-referencing IIFE
// =============================================================================

fn lower_loop_general(
    ctx: &mut LowerCtx,
    expr: &Expr,
    bindings: &[LoopBinding<'_>],
    body: &[Expr],
) -> Result<Node, LowerError> {
    let inits = bindings
        .iter()
        .map(|b| lower_value(ctx, b.init))
        .collect::<Result<Vec<Node>, LowerError>>()?;

    let loop_name = ctx.fresh_loop_name();
    let frame = LoopFrame {
        name: loop_name.clone(),
        arity: bindings.len(),
    };
    // The loop function is an IIFE: user `return` inside the body becomes
    // a sentinel throw.
    let statements = ctx.with_iife(|ctx| ctx.with_loop(frame, |ctx| {
        let mut statements = Vec::with_capacity(body.len());
        for (i, form) in body.iter().enumerate() {
            if i + 1 == body.len() {
                statements.push(lower_loop_tail(ctx, form)?);
            } else {
                statements.push(ensure_statement(lower_expr(ctx, form)?));
            }
        }
        Ok(statements)
    }))?;

    let params = bindings
        .iter()
        .map(|b| Param::simple(b.name.clone()))
        .collect();
    let function = Node::new(
        NodeKind::FunctionExpression {
            id: Some(loop_name),
            params,
            body: Box::new(Node::block(statements, expr.pos.clone())),
            is_async: false,
            is_generator: false,
        },
        expr.pos.clone(),
    );
    Ok(Node::call(function, inits, expr.pos.clone()))
}

/// Lower the tail position of a loop body. `recur` becomes
/// `return loop_N(args)`; `if` branches containing recur lower as
/// statements with value branches wrapped in `return`; `do` recurses into
/// its last form.
fn lower_loop_tail(ctx: &mut LowerCtx, form: &Expr) -> Result<Node, LowerError> {
    if form.is_form("recur") {
        return lower_recur(ctx, form);
    }

    if form.is_form("if") && contains_recur(form) {
        let children = form.list_children().unwrap_or(&[]);
        let (test, then, alt) = match children {
            [_, test, then] => (test, then, None),
            [_, test, then, alt] => (test, then, Some(alt)),
            _ => {
                return Err(LowerError::validation(
                    "if",
                    "`(if test then else?)`",
                    format!("{} forms", children.len().saturating_sub(1)),
                )
                .with_pos(form.pos.clone()));
            }
        };
        let test = lower_value(ctx, test)?;
        let consequent = lower_loop_tail(ctx, then)?;
        let alternate = alt.map(|a| lower_loop_tail(ctx, a)).transpose()?;
        return Ok(Node::new(
            NodeKind::IfStatement {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: alternate.map(Box::new),
            },
            form.pos.clone(),
        ));
    }

    if form.is_form("do") && contains_recur(form) {
        let children = form.list_children().unwrap_or(&[]);
        let body = &children[1..];
        let mut statements = Vec::with_capacity(body.len());
        for (i, inner) in body.iter().enumerate() {
            if i + 1 == body.len() {
                statements.push(lower_loop_tail(ctx, inner)?);
            } else {
                statements.push(ensure_statement(lower_expr(ctx, inner)?));
            }
        }
        return Ok(Node::block(statements, form.pos.clone()));
    }

    Ok(returned(lower_expr(ctx, form)?))
}

/// `(recur args...)` in tail position: `return loop_N(args)`.
fn lower_recur(ctx: &mut LowerCtx, form: &Expr) -> Result<Node, LowerError> {
    let args = form_args(form);
    let Some(frame) = ctx.current_loop().cloned() else {
        return Err(LowerError::validation(
            "recur",
            "an enclosing loop",
            "recur outside any loop",
        )
        .with_pos(form.pos.clone()));
    };
    if args.len() != frame.arity {
        return Err(LowerError::validation(
            "recur",
            format!("{} arguments to match the loop bindings", frame.arity),
            format!("{} arguments", args.len()),
        )
        .with_pos(form.pos.clone()));
    }
    let arguments = lower_call_args(ctx, args)?;
    let call = Node::call(
        Node::identifier(frame.name, form.pos.clone()),
        arguments,
        form.pos.clone(),
    );
    Ok(Node::ret(Some(call), form.pos.clone()))
}

// =============================================================================
// Native while optimizer
// =============================================================================

/// The recur-carrying branch decomposed: optional `do` prelude
/// statements, then the recur arguments.
struct RecurBranch<'a> {
    prelude: Vec<&'a Expr>,
    recur_args: &'a [Expr],
}

fn decompose_recur_branch(branch: &Expr) -> Option<RecurBranch<'_>> {
    if branch.is_form("recur") {
        return Some(RecurBranch {
            prelude: Vec::new(),
            recur_args: form_args(branch),
        });
    }
    if branch.is_form("do") {
        let children = branch.list_children()?;
        let body = &children[1..];
        let (last, prelude) = body.split_last()?;
        if !last.is_form("recur") {
            return None;
        }
        if prelude.iter().any(|form| contains_recur(form)) {
            return None;
        }
        return Some(RecurBranch {
            prelude: prelude.iter().collect(),
            recur_args: form_args(last),
        });
    }
    None
}

/// How one loop parameter updates between iterations.
enum Update<'a> {
    /// The recur argument is the parameter itself.
    Unchanged,
    /// `p++` / `p--`.
    Step(UpdateOp),
    /// `p op= operand`, operand referencing no other loop parameter.
    Compound(AssignOp, &'a Expr),
    /// New value depends on other parameters: compute into a temporary
    /// from the entering values.
    Temp(&'a Expr),
}

/// Whether the subtree references any of `names` as a bare symbol (or as
/// the base of a member path).
fn references_any(expr: &Expr, names: &[&str]) -> bool {
    match &expr.kind {
        ExprKind::Symbol(symbol) => {
            let base = symbol.split(['.', '?']).next().unwrap_or(symbol);
            names.contains(&base)
        }
        ExprKind::List { children, .. } => {
            children.iter().any(|child| references_any(child, names))
        }
        ExprKind::Literal(_) => false,
    }
}

fn classify_update<'a>(
    param: &str,
    other_params: &[&str],
    arg: &'a Expr,
) -> Update<'a> {
    if arg.symbol_name() == Some(param) {
        return Update::Unchanged;
    }

    let Some(children) = arg.list_children() else {
        // Constants and other non-arithmetic shapes take the temporary
        // path; ordering stays uniform.
        return Update::Temp(arg);
    };
    let (Some(op), [left, right]) = (
        children.first().and_then(|h| h.symbol_name()),
        &children[1..],
    ) else {
        return Update::Temp(arg);
    };

    let assign_op = match op {
        "+" => AssignOp::AddAssign,
        "-" => AssignOp::SubAssign,
        "*" => AssignOp::MulAssign,
        "/" => AssignOp::DivAssign,
        _ => return Update::Temp(arg),
    };

    let operand = if left.symbol_name() == Some(param) {
        right
    } else if right.symbol_name() == Some(param)
        && matches!(assign_op, AssignOp::AddAssign | AssignOp::MulAssign)
    {
        // `-` and `/` are not commutative: the parameter must be the left
        // operand.
        left
    } else {
        return Update::Temp(arg);
    };

    if references_any(operand, other_params) {
        return Update::Temp(arg);
    }

    if matches!(assign_op, AssignOp::AddAssign | AssignOp::SubAssign)
        && operand.number_value() == Some(1.0)
    {
        return Update::Step(if assign_op == AssignOp::AddAssign {
            UpdateOp::Increment
        } else {
            UpdateOp::Decrement
        });
    }

    Update::Compound(assign_op, operand)
}

/// Attempt the native-while lowering. Returns `None` when the body does
/// not match the restricted shape.
fn try_optimize_while(
    ctx: &mut LowerCtx,
    expr: &Expr,
    bindings: &[LoopBinding<'_>],
    body: &Expr,
) -> Result<Option<Node>, LowerError> {
    if !body.is_form("if") || !contains_recur(body) {
        return Ok(None);
    }
    let children = body.list_children().unwrap_or(&[]);
    let (test, then, alt) = match children {
        [_, test, then] => (test, then, None),
        [_, test, then, alt] => (test, then, Some(alt)),
        _ => return Ok(None),
    };

    let then_recurs = contains_recur(then);
    let alt_recurs = alt.is_some_and(contains_recur);

    // Exactly one branch may recur; the other produces the loop's value.
    let (recur_branch, value_branch, negate) = match (then_recurs, alt_recurs) {
        (true, false) => (then, alt, false),
        (false, true) => match alt {
            Some(alt) => (alt, Some(then), true),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    let Some(decomposed) = decompose_recur_branch(recur_branch) else {
        return Ok(None);
    };
    if decomposed.recur_args.len() != bindings.len() {
        return Err(LowerError::validation(
            "recur",
            format!("{} arguments to match the loop bindings", bindings.len()),
            format!("{} arguments", decomposed.recur_args.len()),
        )
        .with_pos(expr.pos.clone()));
    }

    let pos = expr.pos.clone();
    let param_names: Vec<&str> = bindings.iter().map(|b| b.name.as_str()).collect();
    // The generated wrapper is an IIFE like any other.
    let node = ctx.with_iife(|ctx| {
        let mut statements = Vec::new();

        // let p1 = i1; let p2 = i2; ...
        for binding in bindings {
            let init = lower_value(ctx, binding.init)?;
            statements.push(Node::new(
                NodeKind::VariableDeclaration {
                    kind: DeclarationKind::Let,
                    declarators: vec![VariableDeclarator {
                        id: Pattern::Identifier {
                            name: binding.name.clone(),
                        },
                        init: Some(init),
                        type_annotation: None,
                    }],
                },
                binding.init.pos.clone(),
            ));
        }

        let mut test_node = lower_value(ctx, test)?;
        if negate {
            test_node = Node::new(
                NodeKind::UnaryExpression {
                    op: UnaryOp::Not,
                    argument: Box::new(test_node),
                    prefix: true,
                },
                pos.clone(),
            );
        }

        // Loop body: prelude statements, then the update block.
        let mut while_body = Vec::new();
        for form in &decomposed.prelude {
            while_body.push(ensure_statement(lower_expr(ctx, form)?));
        }
        while_body.extend(lower_update_block(
            ctx,
            bindings,
            &param_names,
            decomposed.recur_args,
        )?);

        statements.push(Node::new(
            NodeKind::WhileStatement {
                test: Box::new(test_node),
                body: Box::new(Node::block(while_body, pos.clone())),
            },
            pos.clone(),
        ));

        // return <value-branch>
        let value = match value_branch {
            Some(branch) => lower_value(ctx, branch)?,
            None => Node::null(pos.clone()),
        };
        statements.push(Node::ret(Some(value), pos.clone()));

        Ok(iife_expression(statements, pos))
    })?;
    Ok(Some(node))
}

/// Emit the per-iteration update statements.
///
/// Temporaries are computed first (from the entering parameter values),
/// then assigned, and compound updates are emitted strictly last so no
/// dependent computation observes an already-updated value.
fn lower_update_block(
    ctx: &mut LowerCtx,
    bindings: &[LoopBinding<'_>],
    param_names: &[&str],
    recur_args: &[Expr],
) -> Result<Vec<Node>, LowerError> {
    let mut temp_decls = Vec::new();
    let mut temp_assigns = Vec::new();
    let mut compound_updates = Vec::new();

    for (binding, arg) in bindings.iter().zip(recur_args) {
        let others: Vec<&str> = param_names
            .iter()
            .copied()
            .filter(|n| *n != binding.name)
            .collect();
        let pos = arg.pos.clone();
        match classify_update(&binding.name, &others, arg) {
            Update::Unchanged => {}
            Update::Step(op) => {
                compound_updates.push(Node::expr_stmt(
                    Node::new(
                        NodeKind::UpdateExpression {
                            op,
                            argument: Box::new(Node::identifier(
                                binding.name.clone(),
                                pos.clone(),
                            )),
                            prefix: false,
                        },
                        pos.clone(),
                    ),
                    pos,
                ));
            }
            Update::Compound(op, operand) => {
                let operand = lower_value(ctx, operand)?;
                compound_updates.push(Node::expr_stmt(
                    Node::new(
                        NodeKind::AssignmentExpression {
                            op,
                            target: Box::new(Node::identifier(
                                binding.name.clone(),
                                pos.clone(),
                            )),
                            value: Box::new(operand),
                        },
                        pos.clone(),
                    ),
                    pos,
                ));
            }
            Update::Temp(arg) => {
                let temp_name = format!("{TEMP_PREFIX}{}", binding.name);
                let value = lower_value(ctx, arg)?;
                temp_decls.push(Node::new(
                    NodeKind::VariableDeclaration {
                        kind: DeclarationKind::Const,
                        declarators: vec![VariableDeclarator {
                            id: Pattern::Identifier {
                                name: temp_name.clone(),
                            },
                            init: Some(value),
                            type_annotation: None,
                        }],
                    },
                    pos.clone(),
                ));
                temp_assigns.push(Node::expr_stmt(
                    Node::new(
                        NodeKind::AssignmentExpression {
                            op: AssignOp::Assign,
                            target: Box::new(Node::identifier(
                                binding.name.clone(),
                                pos.clone(),
                            )),
                            value: Box::new(Node::identifier(temp_name, pos.clone())),
                        },
                        pos.clone(),
                    ),
                    pos,
                ));
            }
        }
    }

    let mut updates = temp_decls;
    updates.extend(temp_assigns);
    updates.extend(compound_updates);
    Ok(updates)
}

// =============================================================================
// while / for-of / labels
// =============================================================================

/// `(while test body...)` — a macro on top of `loop`/`recur`:
/// `(loop [] (if test (do body... (recur)) null))`.
pub fn lower_while(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(test) = args.first() else {
        return Err(LowerError::validation(
            "while",
            "`(while test body...)`",
            "no test",
        )
        .with_pos(expr.pos.clone()));
    };
    let pos = expr.pos.clone();

    let mut do_children = vec![Expr::symbol("do", pos.clone())];
    do_children.extend(args[1..].iter().cloned());
    do_children.push(Expr::list(vec![Expr::symbol("recur", pos.clone())], pos.clone()));

    let desugared = Expr::list(
        vec![
            Expr::symbol("loop", pos.clone()),
            Expr::list(Vec::new(), pos.clone()),
            Expr::list(
                vec![
                    Expr::symbol("if", pos.clone()),
                    test.clone(),
                    Expr::list(do_children, pos.clone()),
                    Expr::literal(hql_reader::Literal::Null, pos.clone()),
                ],
                pos.clone(),
            ),
        ],
        pos,
    );
    ctx.with_jump_target(|ctx| lower_loop(ctx, &desugared))
}

/// `(for-of [x coll] body...)` / `(for-await-of ...)`.
///
/// Normally wrapped in a null-returning IIFE so iteration is an
/// expression; when the body carries a labeled jump the statement is left
/// bare and the enclosing label form does the wrapping.
pub fn lower_for_of(
    ctx: &mut LowerCtx,
    expr: &Expr,
    is_await: bool,
) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let Some(binding_expr) = args.first() else {
        return Err(LowerError::validation(
            "for-of",
            "`(for-of [name coll] body...)`",
            "no binding",
        )
        .with_pos(expr.pos.clone()));
    };
    let elements: &[Expr] = match &binding_expr.kind {
        ExprKind::List {
            children,
            kind: ListKind::VectorLiteral,
        } => &children[1..],
        ExprKind::List {
            children,
            kind: ListKind::Parens,
        } => children,
        _ => {
            return Err(LowerError::validation(
                "for-of",
                "`[name coll]` binding",
                binding_expr.describe(),
            )
            .with_pos(binding_expr.pos.clone()));
        }
    };
    let [target, source] = elements else {
        return Err(LowerError::validation(
            "for-of",
            "`[name coll]` with exactly two forms",
            format!("{} forms", elements.len()),
        )
        .with_pos(binding_expr.pos.clone()));
    };

    let pattern = parse_pattern(ctx, target)?;
    let left = Node::new(
        NodeKind::VariableDeclaration {
            kind: DeclarationKind::Const,
            declarators: vec![VariableDeclarator {
                id: pattern,
                init: None,
                type_annotation: None,
            }],
        },
        target.pos.clone(),
    );
    let right = lower_value(ctx, source)?;
    // Iteration is expression-valued via an IIFE (the label rewriter may
    // hoist it, but a user `return` still crosses an IIFE either way).
    let body_statements = ctx.with_iife(|ctx| {
        ctx.with_jump_target(|ctx| {
            form_args(expr)[1..]
                .iter()
                .map(|form| Ok(ensure_statement(lower_expr(ctx, form)?)))
                .collect::<Result<Vec<Node>, LowerError>>()
        })
    })?;

    let pos = expr.pos.clone();
    let for_of = Node::new(
        NodeKind::ForOfStatement {
            left: Box::new(left),
            right: Box::new(right),
            body: Box::new(Node::block(body_statements, pos.clone())),
            is_await,
        },
        pos.clone(),
    );

    // A labeled jump out of this loop must stay in the label's function
    // scope; the label form wraps instead.
    let carries_labeled_jump = args[1..].iter().any(ast_has_labeled_jump);
    if carries_labeled_jump {
        return Ok(for_of);
    }

    let statements = vec![for_of, Node::ret(Some(Node::null(pos.clone())), pos.clone())];
    let (body_await, body_yield) = crate::body::async_generator_effects(&statements);
    let is_async = body_await || is_await;
    let call = Node::iife(
        Node::block(statements, pos.clone()),
        is_async,
        body_yield,
        pos.clone(),
    );
    Ok(crate::body::wrap_effectful_call(call, is_async, body_yield, pos))
}

/// `(label L stmt)`.
pub fn lower_label(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let [name_expr, statement] = args else {
        return Err(LowerError::validation(
            "label",
            "`(label name statement)`",
            format!("{} forms", args.len()),
        )
        .with_pos(expr.pos.clone()));
    };
    let Some(label) = name_expr.symbol_name() else {
        return Err(LowerError::validation(
            "label",
            "a symbol label name",
            name_expr.describe(),
        )
        .with_pos(name_expr.pos.clone()));
    };

    // Redundant labels are elided: no targeted jump, no label statement.
    if !ast_targets_label(statement, label) {
        return lower_expr(ctx, statement);
    }

    let shadowed = ctx.has_label(label);
    let body = ctx.with_label(label.to_string(), |ctx| lower_expr(ctx, statement))?;
    let labeled = Node::new(
        NodeKind::LabeledStatement {
            label: label.to_string(),
            body: Box::new(ensure_statement(body)),
        },
        expr.pos.clone(),
    );

    // A for-of below jumps to this label and no outer label shares the
    // name: wrap the whole labeled block in a null-returning IIFE so the
    // bare for-of and its label live in one function scope.
    if ast_for_of_targets_label(statement, label) && !shadowed {
        let pos = expr.pos.clone();
        let statements = vec![labeled, Node::ret(Some(Node::null(pos.clone())), pos.clone())];
        return Ok(iife_expression(statements, pos));
    }
    Ok(labeled)
}

/// `(break label?)`.
pub fn lower_break(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    lower_jump(ctx, expr, "break")
}

/// `(continue label?)`.
pub fn lower_continue(ctx: &mut LowerCtx, expr: &Expr) -> Result<Node, LowerError> {
    lower_jump(ctx, expr, "continue")
}

fn lower_jump(ctx: &mut LowerCtx, expr: &Expr, which: &str) -> Result<Node, LowerError> {
    let args = form_args(expr);
    let label = match args {
        [] => None,
        [label_expr] => match label_expr.symbol_name() {
            Some(label) => Some(label.to_string()),
            None => {
                return Err(LowerError::validation(
                    which,
                    "a symbol label",
                    label_expr.describe(),
                )
                .with_pos(label_expr.pos.clone()));
            }
        },
        _ => {
            return Err(LowerError::validation(
                which,
                format!("`({which} label?)`"),
                format!("{} forms", args.len()),
            )
            .with_pos(expr.pos.clone()));
        }
    };

    match &label {
        Some(label) => {
            if !ctx.has_label(label) {
                return Err(LowerError::validation(
                    which,
                    format!("an enclosing label named `{label}`"),
                    "no such label in scope",
                )
                .with_pos(expr.pos.clone()));
            }
        }
        None => {
            if !ctx.in_jump_context() {
                return Err(LowerError::validation(
                    which,
                    "an enclosing loop",
                    format!("{which} outside any loop"),
                )
                .with_pos(expr.pos.clone()));
            }
        }
    }

    let kind = if which == "break" {
        NodeKind::BreakStatement { label }
    } else {
        NodeKind::ContinueStatement { label }
    };
    Ok(Node::new(kind, expr.pos.clone()))
}
