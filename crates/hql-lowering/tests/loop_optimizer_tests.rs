use hql_ir::{
    AssignOp, BinaryOp, DeclarationKind, Node, NodeKind, Pattern, Program, UnaryOp, UpdateOp,
};
use hql_lowering::lower;
use hql_reader::read;

fn lower_source(source: &str) -> Program {
    let ast = read(source, "test.hql").expect("read should succeed");
    lower(&ast, ".").expect("lowering should succeed")
}

fn first_expr(source: &str) -> Node {
    let mut program = lower_source(source);
    match program.body.remove(0).kind {
        NodeKind::ExpressionStatement { expression } => *expression,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

/// Unwrap `(() => { ... })()` into the body statements.
fn iife_body(node: Node) -> Vec<Node> {
    let NodeKind::CallExpression { callee, .. } = node.kind else {
        panic!("expected IIFE call, got {:?}", node.kind);
    };
    let NodeKind::FunctionExpression { body, .. } = callee.kind else {
        panic!("expected function callee");
    };
    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block body");
    };
    body
}

fn assert_let_decl(node: &Node, name: &str) {
    let NodeKind::VariableDeclaration { kind, declarators } = &node.kind else {
        panic!("expected declaration, got {:?}", node.kind);
    };
    assert_eq!(*kind, DeclarationKind::Let);
    assert!(
        matches!(&declarators[0].id, Pattern::Identifier { name: n } if n == name),
        "expected let {name}"
    );
}

// =============================================================================
// The native-while optimization
// =============================================================================

#[test]
fn test_counting_loop_matches_spec_shape() {
    // (loop [i 0 sum 0] (if (< i 100) (recur (+ i 1) (+ sum i)) sum))
    let body = iife_body(first_expr(
        "(loop [i 0 sum 0] (if (< i 100) (recur (+ i 1) (+ sum i)) sum))",
    ));
    assert_eq!(body.len(), 4, "let i, let sum, while, return");
    assert_let_decl(&body[0], "i");
    assert_let_decl(&body[1], "sum");

    let NodeKind::WhileStatement { test, body: while_body } = &body[2].kind else {
        panic!("expected native while, got {:?}", body[2].kind);
    };
    assert!(matches!(
        test.kind,
        NodeKind::BinaryExpression { op: BinaryOp::Lt, .. }
    ));

    let NodeKind::BlockStatement { body: updates } = &while_body.kind else {
        panic!("expected while block");
    };
    // Temporary computed from entering values, assigned, then the
    // compound update strictly last.
    assert_eq!(updates.len(), 3);
    let NodeKind::VariableDeclaration { kind, declarators } = &updates[0].kind else {
        panic!("expected temp declaration first, got {:?}", updates[0].kind);
    };
    assert_eq!(*kind, DeclarationKind::Const);
    assert!(matches!(
        &declarators[0].id,
        Pattern::Identifier { name } if name == "__hql_temp_sum"
    ));
    assert!(matches!(
        declarators[0].init.as_ref().expect("temp init").kind,
        NodeKind::BinaryExpression { op: BinaryOp::Add, .. }
    ));

    let NodeKind::ExpressionStatement { expression } = &updates[1].kind else {
        panic!("expected temp assignment");
    };
    let NodeKind::AssignmentExpression { op, target, value } = &expression.kind else {
        panic!("expected assignment");
    };
    assert_eq!(*op, AssignOp::Assign);
    assert!(matches!(&target.kind, NodeKind::Identifier { name } if name == "sum"));
    assert!(
        matches!(&value.kind, NodeKind::Identifier { name } if name == "__hql_temp_sum")
    );

    let NodeKind::ExpressionStatement { expression } = &updates[2].kind else {
        panic!("expected compound update last");
    };
    let NodeKind::UpdateExpression { op, argument, .. } = &expression.kind else {
        panic!("expected i++ last, got {:?}", expression.kind);
    };
    assert_eq!(*op, UpdateOp::Increment);
    assert!(matches!(&argument.kind, NodeKind::Identifier { name } if name == "i"));

    let NodeKind::ReturnStatement { argument: Some(result) } = &body[3].kind else {
        panic!("expected trailing return");
    };
    assert!(matches!(&result.kind, NodeKind::Identifier { name } if name == "sum"));
}

#[test]
fn test_decrement_and_recur_in_alternate_negates_test() {
    let body = iife_body(first_expr("(loop [i 10] (if (<= i 0) i (recur (- i 1))))"));
    let NodeKind::WhileStatement { test, body: while_body } = &body[1].kind else {
        panic!("expected while");
    };
    let NodeKind::UnaryExpression { op: UnaryOp::Not, argument, .. } = &test.kind else {
        panic!("recur in the alternate branch negates the test");
    };
    assert!(matches!(
        argument.kind,
        NodeKind::BinaryExpression { op: BinaryOp::Le, .. }
    ));
    let NodeKind::BlockStatement { body: updates } = &while_body.kind else {
        panic!("expected block");
    };
    let NodeKind::ExpressionStatement { expression } = &updates[0].kind else {
        panic!("expected update statement");
    };
    assert!(matches!(
        expression.kind,
        NodeKind::UpdateExpression { op: UpdateOp::Decrement, .. }
    ));
}

#[test]
fn test_compound_assignments_for_scaling() {
    let body = iife_body(first_expr("(loop [n 1] (if (< n 100) (recur (* n 2)) n))"));
    let NodeKind::WhileStatement { body: while_body, .. } = &body[1].kind else {
        panic!("expected while");
    };
    let NodeKind::BlockStatement { body: updates } = &while_body.kind else {
        panic!("expected block");
    };
    let NodeKind::ExpressionStatement { expression } = &updates[0].kind else {
        panic!("expected update");
    };
    let NodeKind::AssignmentExpression { op, .. } = &expression.kind else {
        panic!("expected compound assignment, got {:?}", expression.kind);
    };
    assert_eq!(*op, AssignOp::MulAssign);
}

#[test]
fn test_division_requires_parameter_on_left() {
    // (recur (/ 100 n)): n is the right operand of /, so no compound
    // assignment; a temporary preserves the semantics.
    let body = iife_body(first_expr("(loop [n 64] (if (> n 1) (recur (/ 100 n)) n))"));
    let NodeKind::WhileStatement { body: while_body, .. } = &body[1].kind else {
        panic!("expected while");
    };
    let NodeKind::BlockStatement { body: updates } = &while_body.kind else {
        panic!("expected block");
    };
    assert!(
        matches!(updates[0].kind, NodeKind::VariableDeclaration { .. }),
        "right-operand division must go through a temporary"
    );
}

#[test]
fn test_mutually_dependent_updates_observe_entering_values() {
    // Both parameters read each other: both must use temporaries computed
    // before either assignment.
    let body = iife_body(first_expr(
        "(loop [a 0 b 1] (if (< a 10) (recur b (+ a b)) a))",
    ));
    let NodeKind::WhileStatement { body: while_body, .. } = &body[2].kind else {
        panic!("expected while");
    };
    let NodeKind::BlockStatement { body: updates } = &while_body.kind else {
        panic!("expected block");
    };
    assert_eq!(updates.len(), 4, "two temp decls then two assignments");
    assert!(matches!(updates[0].kind, NodeKind::VariableDeclaration { .. }));
    assert!(matches!(updates[1].kind, NodeKind::VariableDeclaration { .. }));
    assert!(matches!(updates[2].kind, NodeKind::ExpressionStatement { .. }));
    assert!(matches!(updates[3].kind, NodeKind::ExpressionStatement { .. }));
}

#[test]
fn test_do_prelude_statements_precede_updates() {
    let body = iife_body(first_expr(
        "(loop [i 0] (if (< i 3) (do (emit i) (recur (+ i 1))) null))",
    ));
    let NodeKind::WhileStatement { body: while_body, .. } = &body[1].kind else {
        panic!("expected while");
    };
    let NodeKind::BlockStatement { body: statements } = &while_body.kind else {
        panic!("expected block");
    };
    assert_eq!(statements.len(), 2);
    let NodeKind::ExpressionStatement { expression } = &statements[0].kind else {
        panic!("expected prelude statement first");
    };
    assert!(matches!(expression.kind, NodeKind::CallExpression { .. }));
    let NodeKind::ExpressionStatement { expression } = &statements[1].kind else {
        panic!("expected update after prelude");
    };
    assert!(matches!(expression.kind, NodeKind::UpdateExpression { .. }));
}

// =============================================================================
// The general self-referencing IIFE
// =============================================================================

#[test]
fn test_non_matching_shape_uses_named_iife() {
    // Two body forms: the optimizer declines.
    let node = first_expr("(loop [i 0] (emit i) (if (< i 3) (recur (+ i 1)) i))");
    let NodeKind::CallExpression { callee, arguments } = node.kind else {
        panic!("expected loop call");
    };
    assert_eq!(arguments.len(), 1, "initial value passed in the call");
    let NodeKind::FunctionExpression { id, params, body, .. } = callee.kind else {
        panic!("expected function callee");
    };
    let loop_name = id.expect("loop function is named");
    assert!(loop_name.starts_with("loop_"));
    assert_eq!(params.len(), 1);

    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block");
    };
    // Tail if: recur branch returns the self-call, value branch returns.
    let NodeKind::IfStatement { consequent, alternate, .. } = &body[1].kind else {
        panic!("expected tail if, got {:?}", body[1].kind);
    };
    let NodeKind::ReturnStatement { argument: Some(recur_call) } = &consequent.kind else {
        panic!("recur branch must return");
    };
    let NodeKind::CallExpression { callee, .. } = &recur_call.kind else {
        panic!("recur lowers to a self-call");
    };
    assert!(
        matches!(&callee.kind, NodeKind::Identifier { name } if *name == loop_name),
        "recur targets the enclosing loop by name"
    );
    assert!(matches!(
        alternate.as_ref().expect("value branch").kind,
        NodeKind::ReturnStatement { .. }
    ));
}

#[test]
fn test_nested_loops_get_distinct_ids() {
    let node = first_expr(
        "(loop [i 0] (if (< i 2) (recur (+ i (loop [j 0] (emit j) (if (< j 2) (recur (+ j 1)) j)))) i))",
    );
    // Outer loop matches the optimizer; the inner one (two body forms)
    // is a named IIFE with its own id targeted by its own recur.
    let mut names = Vec::new();
    collect_loop_names(&node, &mut names);
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("loop_"));
}

fn collect_loop_names(node: &Node, out: &mut Vec<String>) {
    if let NodeKind::FunctionExpression { id: Some(id), .. } = &node.kind {
        if id.starts_with("loop_") {
            out.push(id.clone());
        }
    }
    hql_ir::visit::for_each_child(&node.kind, &mut |child| collect_loop_names(child, out));
}

// =============================================================================
// recur validation
// =============================================================================

#[test]
fn test_recur_outside_loop_is_error() {
    let ast = read("(recur 1)", "test.hql").expect("read");
    let err = lower(&ast, ".").expect_err("recur outside a loop must fail");
    assert!(err.expected.contains("loop"), "{err}");
}

#[test]
fn test_recur_arity_mismatch_is_error() {
    let ast = read(
        "(loop [i 0 j 0] (if (< i 3) (recur (+ i 1)) i))",
        "test.hql",
    )
    .expect("read");
    let err = lower(&ast, ".").expect_err("recur arity must match bindings");
    assert!(err.expected.contains("2 arguments"), "{err}");
}

#[test]
fn test_non_tail_recur_is_error() {
    let ast = read("(loop [i 0] (emit (recur (+ i 1))))", "test.hql").expect("read");
    let err = lower(&ast, ".").expect_err("recur must be in tail position");
    assert!(err.expected.contains("tail"), "{err}");
}

// =============================================================================
// while / for-of / labels
// =============================================================================

#[test]
fn test_while_macro_produces_native_while() {
    let body = iife_body(first_expr("(while (< i 3) (work))"));
    assert_eq!(body.len(), 2);
    let NodeKind::WhileStatement { body: while_body, .. } = &body[0].kind else {
        panic!("expected while, got {:?}", body[0].kind);
    };
    let NodeKind::BlockStatement { body: statements } = &while_body.kind else {
        panic!("expected block");
    };
    assert_eq!(statements.len(), 1, "zero bindings mean no update block");
    let NodeKind::ReturnStatement { argument: Some(result) } = &body[1].kind else {
        panic!("expected return");
    };
    assert!(matches!(result.kind, NodeKind::NullLiteral));
}

#[test]
fn test_for_of_is_null_returning_iife() {
    let body = iife_body(first_expr("(for-of [x xs] (emit x))"));
    assert_eq!(body.len(), 2);
    let NodeKind::ForOfStatement { is_await, left, .. } = &body[0].kind else {
        panic!("expected for-of, got {:?}", body[0].kind);
    };
    assert!(!is_await);
    assert!(matches!(left.kind, NodeKind::VariableDeclaration { .. }));
    let NodeKind::ReturnStatement { argument: Some(result) } = &body[1].kind else {
        panic!("expected return null");
    };
    assert!(matches!(result.kind, NodeKind::NullLiteral));
}

#[test]
fn test_for_await_of_wraps_in_awaited_async_iife() {
    let node = first_expr("(for-await-of [x xs] (emit x))");
    let NodeKind::AwaitExpression { argument } = node.kind else {
        panic!("expected awaited IIFE");
    };
    let NodeKind::CallExpression { callee, .. } = argument.kind else {
        panic!("expected call");
    };
    let NodeKind::FunctionExpression { is_async, body, .. } = callee.kind else {
        panic!("expected function");
    };
    assert!(is_async);
    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block");
    };
    assert!(matches!(
        body[0].kind,
        NodeKind::ForOfStatement { is_await: true, .. }
    ));
}

#[test]
fn test_break_and_continue_in_loop_context() {
    let body = iife_body(first_expr("(for-of [x xs] (if (bad? x) (continue) (emit x)))"));
    let NodeKind::ForOfStatement { body: loop_body, .. } = &body[0].kind else {
        panic!("expected for-of");
    };
    let NodeKind::BlockStatement { body: statements } = &loop_body.kind else {
        panic!("expected block");
    };
    let NodeKind::IfStatement { consequent, .. } = &statements[0].kind else {
        panic!("expected if, got {:?}", statements[0].kind);
    };
    assert!(matches!(
        consequent.kind,
        NodeKind::ContinueStatement { label: None }
    ));
}

#[test]
fn test_break_outside_loop_is_error() {
    let ast = read("(break)", "test.hql").expect("read");
    let err = lower(&ast, ".").expect_err("break outside a loop must fail");
    assert!(err.expected.contains("loop"), "{err}");
}

#[test]
fn test_labeled_break_requires_label_in_scope() {
    let ast = read("(for-of [x xs] (break missing))", "test.hql").expect("read");
    let err = lower(&ast, ".").expect_err("unknown label must fail");
    assert!(err.expected.contains("missing"), "{err}");
}

#[test]
fn test_redundant_label_is_elided() {
    let node = first_expr("(label unused (do (a) (b)))");
    // No jump targets the label, so no LabeledStatement appears.
    let mut found_label = false;
    hql_ir::visit::walk(&node, &mut |n| {
        if matches!(n.kind, NodeKind::LabeledStatement { .. }) {
            found_label = true;
        }
    });
    assert!(!found_label);
}

#[test]
fn test_label_over_targeted_for_of_wraps_in_iife() {
    let node = first_expr(
        "(label outer (for-of [x xs] (if (big? x) (break outer) (emit x))))",
    );
    let body = iife_body(node);
    let NodeKind::LabeledStatement { label, body: labeled_body } = &body[0].kind else {
        panic!("expected labeled statement inside IIFE, got {:?}", body[0].kind);
    };
    assert_eq!(label, "outer");
    // The for-of stays bare so the labeled jump shares the IIFE's scope.
    assert!(matches!(labeled_body.kind, NodeKind::ForOfStatement { .. }));
    let NodeKind::ReturnStatement { argument: Some(result) } = &body[1].kind else {
        panic!("expected return null");
    };
    assert!(matches!(result.kind, NodeKind::NullLiteral));
}
