use hql_ir::{
    BinaryOp, DeclarationKind, ImportSpecifier, MethodKind, Node, NodeKind, ObjectProperty,
    Pattern, Program,
};
use hql_lowering::lower;
use hql_reader::read;

fn lower_source(source: &str) -> Program {
    let ast = read(source, "test.hql").expect("read should succeed");
    lower(&ast, ".").expect("lowering should succeed")
}

fn first_node(source: &str) -> Node {
    let mut program = lower_source(source);
    assert!(!program.body.is_empty(), "program should lower to nodes");
    program.body.remove(0)
}

/// Unwrap a top-level `ExpressionStatement`.
fn first_expr(source: &str) -> Node {
    match first_node(source).kind {
        NodeKind::ExpressionStatement { expression } => *expression,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn lower_error(source: &str) -> hql_common::LowerError {
    let ast = read(source, "test.hql").expect("read should succeed");
    lower(&ast, ".").expect_err("lowering should fail")
}

// =============================================================================
// Dispatch and top-level invariants
// =============================================================================

#[test]
fn test_binary_call_scenario() {
    // (+ 1 2) -> ExpressionStatement(BinaryExpression('+', 1, 2))
    let node = first_expr("(+ 1 2)");
    let NodeKind::BinaryExpression { op, left, right } = node.kind else {
        panic!("expected binary expression, got {:?}", node.kind);
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(left.kind, NodeKind::NumericLiteral { value } if value == 1.0));
    assert!(matches!(right.kind, NodeKind::NumericLiteral { value } if value == 2.0));
}

#[test]
fn test_top_level_nodes_are_statements() {
    let program = lower_source(
        "(def x 1)\n(+ x 2)\n(fn f [a] a)\n(if (> x 0) \"pos\" \"neg\")\n(class C)",
    );
    for node in &program.body {
        assert!(
            !node.is_expression(),
            "top-level node must be statement-shaped: {:?}",
            node.kind
        );
    }
}

#[test]
fn test_operator_as_value_reifies() {
    let node = first_expr("(map + xs)");
    let NodeKind::CallExpression { arguments, .. } = node.kind else {
        panic!("expected call");
    };
    let NodeKind::CallExpression { callee, arguments: op_args } = &arguments[0].kind else {
        panic!("expected operator reification call, got {:?}", arguments[0].kind);
    };
    assert!(
        matches!(&callee.kind, NodeKind::Identifier { name } if name == "__hql_get_op")
    );
    assert!(
        matches!(&op_args[0].kind, NodeKind::StringLiteral { value } if value == "+")
    );
}

#[test]
fn test_underscore_is_string_literal() {
    let node = first_expr("_");
    assert!(matches!(node.kind, NodeKind::StringLiteral { value } if value == "_"));
}

#[test]
fn test_js_prefix_passthrough() {
    let node = first_expr("js/console-log");
    assert!(matches!(node.kind, NodeKind::Identifier { name } if name == "console_log"));
}

#[test]
fn test_hyphenated_symbols_sanitize() {
    let node = first_expr("my-var");
    assert!(matches!(node.kind, NodeKind::Identifier { name } if name == "my_var"));
}

#[test]
fn test_dot_path_becomes_guarded_access() {
    let node = first_expr("obj.a.b");
    let NodeKind::InteropIIFE {
        object,
        property_path,
    } = node.kind
    else {
        panic!("expected guarded access node");
    };
    assert!(matches!(&object.kind, NodeKind::Identifier { name } if name == "obj"));
    assert_eq!(property_path, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_optional_chain_flags_in_order() {
    // a?.b.c?.d: the optional bit sits on the steps written `?.`.
    let node = first_expr("a?.b.c?.d");
    let NodeKind::OptionalMemberExpression {
        object: step_c, property: prop_d, ..
    } = node.kind
    else {
        panic!("outermost step should be optional (`?.d`)");
    };
    assert!(matches!(&prop_d.kind, NodeKind::Identifier { name } if name == "d"));
    let NodeKind::MemberExpression { object: step_b, property: prop_c, .. } = &step_c.kind
    else {
        panic!("`.c` step should be plain member access");
    };
    assert!(matches!(&prop_c.kind, NodeKind::Identifier { name } if name == "c"));
    let NodeKind::OptionalMemberExpression { object: base, property: prop_b, .. } =
        &step_b.kind
    else {
        panic!("`a?.b` step should be optional");
    };
    assert!(matches!(&prop_b.kind, NodeKind::Identifier { name } if name == "b"));
    assert!(matches!(&base.kind, NodeKind::Identifier { name } if name == "a"));
}

#[test]
fn test_dot_method_call() {
    let node = first_expr("(.push stack 42)");
    let NodeKind::CallExpression { callee, arguments } = node.kind else {
        panic!("expected call");
    };
    let NodeKind::MemberExpression { object, property, computed } = callee.kind else {
        panic!("expected member callee");
    };
    assert!(!computed);
    assert!(matches!(&object.kind, NodeKind::Identifier { name } if name == "stack"));
    assert!(matches!(&property.kind, NodeKind::Identifier { name } if name == "push"));
    assert_eq!(arguments.len(), 1);
}

#[test]
fn test_empty_list_is_empty_array() {
    let node = first_expr("()");
    assert!(matches!(node.kind, NodeKind::ArrayExpression { elements } if elements.is_empty()));
}

// =============================================================================
// Call-vs-access disambiguation
// =============================================================================

#[test]
fn test_known_function_head_is_call() {
    let program = lower_source("(fn add [a b] (+ a b)) (add 1)");
    let NodeKind::ExpressionStatement { expression } = &program.body[1].kind else {
        panic!("expected expression statement");
    };
    assert!(
        matches!(&expression.kind, NodeKind::CallExpression { callee, .. }
            if matches!(&callee.kind, NodeKind::Identifier { name } if name == "add"))
    );
}

#[test]
fn test_unknown_head_with_string_is_get() {
    let node = first_expr("(config \"port\")");
    let NodeKind::CallExpression { callee, arguments } = node.kind else {
        panic!("expected call");
    };
    assert!(matches!(&callee.kind, NodeKind::Identifier { name } if name == "__hql_get"));
    assert!(matches!(&arguments[1].kind, NodeKind::StringLiteral { value } if value == "port"));
}

#[test]
fn test_unknown_head_with_number_is_get_numeric() {
    let node = first_expr("(xs 0)");
    let NodeKind::CallExpression { callee, .. } = node.kind else {
        panic!("expected call");
    };
    assert!(
        matches!(&callee.kind, NodeKind::Identifier { name } if name == "__hql_getNumeric")
    );
}

#[test]
fn test_unknown_head_with_other_arg_is_call() {
    let node = first_expr("(handler event)");
    let NodeKind::CallExpression { callee, .. } = node.kind else {
        panic!("expected call");
    };
    assert!(matches!(&callee.kind, NodeKind::Identifier { name } if name == "handler"));
}

// =============================================================================
// Bindings
// =============================================================================

#[test]
fn test_const_initializer_is_deep_frozen() {
    let node = first_node("(def pi 3.14)");
    let NodeKind::VariableDeclaration { kind, declarators } = &node.kind else {
        panic!("expected variable declaration");
    };
    assert_eq!(*kind, DeclarationKind::Const);
    let init = declarators[0].init.as_ref().expect("has init");
    let NodeKind::CallExpression { callee, .. } = &init.kind else {
        panic!("const init must be a deep-freeze call, got {:?}", init.kind);
    };
    assert!(
        matches!(&callee.kind, NodeKind::Identifier { name } if name == "__hql_deepFreeze")
    );
}

#[test]
fn test_let_initializer_is_not_frozen() {
    let node = first_node("(let y 5)");
    let NodeKind::VariableDeclaration { kind, declarators } = &node.kind else {
        panic!("expected variable declaration");
    };
    assert_eq!(*kind, DeclarationKind::Let);
    assert!(matches!(
        declarators[0].init.as_ref().expect("has init").kind,
        NodeKind::NumericLiteral { value } if value == 5.0
    ));
}

#[test]
fn test_simple_binding_id_is_identifier() {
    let node = first_node("(var total 0)");
    let NodeKind::VariableDeclaration { declarators, .. } = &node.kind else {
        panic!("expected variable declaration");
    };
    assert!(declarators[0].id.is_identifier());
}

#[test]
fn test_type_annotation_is_extracted() {
    let node = first_node("(let count:Int 0)");
    let NodeKind::VariableDeclaration { declarators, .. } = &node.kind else {
        panic!("expected variable declaration");
    };
    assert_eq!(declarators[0].type_annotation.as_deref(), Some("Int"));
    assert!(
        matches!(&declarators[0].id, Pattern::Identifier { name } if name == "count")
    );
}

#[test]
fn test_local_binding_packages_into_iife() {
    // (let [n 10] (* n n)) binds once and returns n * n.
    let node = first_expr("(let [n 10] (* n n))");
    let NodeKind::CallExpression { callee, arguments } = node.kind else {
        panic!("expected IIFE call");
    };
    assert!(arguments.is_empty());
    let NodeKind::FunctionExpression { params, body, is_async, is_generator, .. } =
        callee.kind
    else {
        panic!("expected function expression callee");
    };
    assert!(params.is_empty() && !is_async && !is_generator);
    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block body");
    };
    assert_eq!(body.len(), 2);
    let NodeKind::VariableDeclaration { kind, declarators } = &body[0].kind else {
        panic!("first statement should declare n");
    };
    assert_eq!(*kind, DeclarationKind::Let);
    assert!(matches!(&declarators[0].id, Pattern::Identifier { name } if name == "n"));
    let NodeKind::ReturnStatement { argument: Some(returned) } = &body[1].kind else {
        panic!("last statement should return");
    };
    assert!(matches!(
        returned.kind,
        NodeKind::BinaryExpression { op: BinaryOp::Mul, .. }
    ));
}

#[test]
fn test_member_path_binding_is_rejected() {
    let err = lower_error("(var obj.field 1)");
    assert!(err.found.contains("obj.field"), "unexpected error: {err}");
}

#[test]
fn test_await_in_binding_body_marks_async_iife() {
    let node = first_expr("(let (x (await p)) x)");
    let NodeKind::AwaitExpression { argument } = node.kind else {
        panic!("async binding IIFE must be awaited, got something else");
    };
    let NodeKind::CallExpression { callee, .. } = argument.kind else {
        panic!("expected IIFE call under await");
    };
    assert!(matches!(
        callee.kind,
        NodeKind::FunctionExpression { is_async: true, .. }
    ));
}

#[test]
fn test_yield_in_binding_body_marks_generator_iife() {
    let node = first_expr("(let (x 1) (yield x))");
    let NodeKind::YieldExpression { argument: Some(argument), delegate: true } = node.kind
    else {
        panic!("generator binding IIFE must be yield-delegated");
    };
    let NodeKind::CallExpression { callee, .. } = argument.kind else {
        panic!("expected IIFE call under yield*");
    };
    assert!(matches!(
        callee.kind,
        NodeKind::FunctionExpression { is_generator: true, .. }
    ));
}

// =============================================================================
// Conditionals and do
// =============================================================================

#[test]
fn test_if_with_value_branches_is_conditional() {
    let node = first_expr("(if ready \"go\" \"wait\")");
    assert!(matches!(node.kind, NodeKind::ConditionalExpression { .. }));
}

#[test]
fn test_if_with_throw_branch_is_statement() {
    let node = first_node("(if bad (throw err) ok)");
    let NodeKind::IfStatement { consequent, alternate, .. } = node.kind else {
        panic!("control-flow branch forces an if statement");
    };
    assert!(matches!(consequent.kind, NodeKind::ThrowStatement { .. }));
    assert!(matches!(
        alternate.expect("has alternate").kind,
        NodeKind::ExpressionStatement { .. }
    ));
}

#[test]
fn test_do_single_expression_unwraps() {
    let node = first_expr("(do (compute))");
    assert!(matches!(node.kind, NodeKind::CallExpression { .. }));
}

#[test]
fn test_do_multi_becomes_iife_with_return() {
    let node = first_expr("(do (setup) (result))");
    let NodeKind::CallExpression { callee, .. } = node.kind else {
        panic!("expected IIFE");
    };
    let NodeKind::FunctionExpression { body, .. } = callee.kind else {
        panic!("expected function callee");
    };
    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block");
    };
    assert!(matches!(body[0].kind, NodeKind::ExpressionStatement { .. }));
    assert!(matches!(body[1].kind, NodeKind::ReturnStatement { .. }));
}

#[test]
fn test_return_outside_iife_is_plain() {
    let program = lower_source("(fn f [] (return 1))");
    let NodeKind::FnFunctionDeclaration { body, .. } = &program.body[0].kind else {
        panic!("expected fn declaration");
    };
    let NodeKind::BlockStatement { body } = &body.kind else {
        panic!("expected block");
    };
    assert!(matches!(body[0].kind, NodeKind::ReturnStatement { .. }));
}

#[test]
fn test_return_inside_do_block_throws_sentinel_and_wraps_fn() {
    let program = lower_source("(fn f [] (do (return 1) 2))");
    let NodeKind::FnFunctionDeclaration { body, .. } = &program.body[0].kind else {
        panic!("expected fn declaration");
    };
    // The function body must be wrapped in the catch-and-unwrap.
    let NodeKind::BlockStatement { body } = &body.kind else {
        panic!("expected block");
    };
    let NodeKind::TryStatement { handler, .. } = &body[0].kind else {
        panic!("expected unwrap try, got {:?}", body[0].kind);
    };
    let handler = handler.as_ref().expect("has catch");
    assert_eq!(handler.param.as_deref(), Some("e"));
}

#[test]
fn test_switch_lowers_to_equality_chain() {
    let node = first_expr("(switch x (case 1 \"one\") (default \"many\"))");
    let NodeKind::CallExpression { callee, .. } = node.kind else {
        panic!("expected IIFE");
    };
    let NodeKind::FunctionExpression { body, .. } = callee.kind else {
        panic!("expected function callee");
    };
    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block");
    };
    assert!(matches!(body[0].kind, NodeKind::VariableDeclaration { .. }));
    let NodeKind::IfStatement { test, .. } = &body[1].kind else {
        panic!("expected if chain");
    };
    assert!(matches!(
        test.kind,
        NodeKind::BinaryExpression { op: BinaryOp::StrictEq, .. }
    ));
}

// =============================================================================
// try / catch / finally
// =============================================================================

#[test]
fn test_try_catch_finally_shape() {
    let node = first_expr("(try (risky) (catch e (handle e)) (finally (cleanup)))");
    let NodeKind::CallExpression { callee, .. } = node.kind else {
        panic!("expected IIFE");
    };
    let NodeKind::FunctionExpression { body, .. } = callee.kind else {
        panic!("expected function callee");
    };
    let NodeKind::BlockStatement { body } = body.kind else {
        panic!("expected block");
    };
    let NodeKind::TryStatement { block, handler, finalizer } = &body[0].kind else {
        panic!("expected try statement");
    };
    let NodeKind::BlockStatement { body: try_body } = &block.kind else {
        panic!("expected try block");
    };
    assert!(matches!(try_body[0].kind, NodeKind::ReturnStatement { .. }));
    let handler = handler.as_ref().expect("has catch");
    assert_eq!(handler.param.as_deref(), Some("e"));
    let NodeKind::BlockStatement { body: catch_body } = &handler.body.kind else {
        panic!("expected catch block");
    };
    assert!(matches!(catch_body[0].kind, NodeKind::ReturnStatement { .. }));
    // Finalizer gets no implicit return.
    let NodeKind::BlockStatement { body: finally_body } =
        &finalizer.as_ref().expect("has finally").kind
    else {
        panic!("expected finally block");
    };
    assert!(matches!(
        finally_body[0].kind,
        NodeKind::ExpressionStatement { .. }
    ));
}

#[test]
fn test_try_rejects_double_catch() {
    let err = lower_error("(try (a) (catch e 1) (catch f 2))");
    assert!(err.expected.contains("at most one catch"), "{err}");
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_named_fn_is_declaration_with_implicit_return() {
    let node = first_node("(fn add [a b] (+ a b))");
    let NodeKind::FnFunctionDeclaration { id, params, body, .. } = &node.kind else {
        panic!("expected named-lambda declaration");
    };
    assert_eq!(id, "add");
    assert_eq!(params.len(), 2);
    let NodeKind::BlockStatement { body } = &body.kind else {
        panic!("expected block");
    };
    assert!(matches!(body[0].kind, NodeKind::ReturnStatement { .. }));
}

#[test]
fn test_anonymous_fn_is_expression() {
    let node = first_expr("(fn [x] x)");
    assert!(matches!(node.kind, NodeKind::FunctionExpression { id: None, .. }));
}

#[test]
fn test_generator_and_async_flags() {
    let node = first_node("(fn* gen [] (yield 1))");
    assert!(matches!(
        node.kind,
        NodeKind::FnFunctionDeclaration { is_generator: true, .. }
    ));

    let node = first_node("(async fn fetch-it [] (await p))");
    let NodeKind::FnFunctionDeclaration { id, is_async, .. } = &node.kind else {
        panic!("expected declaration");
    };
    assert_eq!(id, "fetch_it");
    assert!(is_async);
}

#[test]
fn test_param_defaults_and_rest() {
    let node = first_node("(fn f [a (b 10) & rest] a)");
    let NodeKind::FnFunctionDeclaration { params, .. } = &node.kind else {
        panic!("expected declaration");
    };
    assert_eq!(params.len(), 3);
    assert!(params[0].default.is_none());
    assert!(params[1].default.is_some());
    assert!(matches!(&params[2].pattern, Pattern::Rest { name } if name == "rest"));
}

#[test]
fn test_json_map_param_style() {
    let node = first_node("(fn g [{a 1 b 2}] (+ a b))");
    let NodeKind::FnFunctionDeclaration { params, .. } = &node.kind else {
        panic!("expected declaration");
    };
    assert_eq!(params.len(), 1);
    let Pattern::Object { entries, .. } = &params[0].pattern else {
        panic!("expected object pattern param");
    };
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0].value, Pattern::Default { .. }));
    // The whole argument may be omitted.
    assert!(matches!(
        params[0].default.as_ref().expect("has default").kind,
        NodeKind::ObjectExpression { .. }
    ));
}

#[test]
fn test_yield_delegate_bit() {
    let node = first_expr("(yield* source)");
    assert!(matches!(node.kind, NodeKind::YieldExpression { delegate: true, .. }));
}

// =============================================================================
// Classes and enums
// =============================================================================

#[test]
fn test_class_members() {
    let program = lower_source(
        "(class Point\n  (var x 0)\n  (let tag \"pt\")\n  (#secret 1)\n  \
         (constructor [x] (= this.x x))\n  (fn dist [] 0)\n  \
         (static fn origin [] (new Point 0))\n  (getter size [] 1)\n  (setter size [v] (= this.x v)))",
    );
    let NodeKind::ClassDeclaration { id, fields, constructor, methods, .. } =
        &program.body[0].kind
    else {
        panic!("expected class declaration");
    };
    assert_eq!(id, "Point");
    assert_eq!(fields.len(), 3);
    assert!(fields[0].mutable);
    assert!(!fields[1].mutable);
    assert!(fields[2].is_private && fields[2].name == "#secret");
    assert!(constructor.is_some());
    assert_eq!(methods.len(), 3);
    assert!(methods.iter().any(|m| m.is_static && m.name == "origin"));
    let getter = methods.iter().find(|m| m.kind == MethodKind::Getter).expect("getter");
    let NodeKind::BlockStatement { body } = &getter.body.kind else {
        panic!("expected getter block");
    };
    assert!(
        matches!(body[0].kind, NodeKind::ReturnStatement { .. }),
        "getters return their last expression"
    );
    let setter = methods.iter().find(|m| m.kind == MethodKind::Setter).expect("setter");
    let NodeKind::BlockStatement { body } = &setter.body.kind else {
        panic!("expected setter block");
    };
    assert!(
        matches!(body[0].kind, NodeKind::ExpressionStatement { .. }),
        "setters get no implicit return"
    );
}

#[test]
fn test_enum_case_shapes() {
    let node = first_node(
        "(enum Status:Int (case ok 200) (case err msg code) (case unknown))",
    );
    let NodeKind::EnumDeclaration { id, raw_type, cases, has_associated_values } =
        &node.kind
    else {
        panic!("expected enum declaration");
    };
    assert_eq!(id, "Status");
    assert_eq!(raw_type.as_deref(), Some("Int"));
    assert!(has_associated_values);
    assert_eq!(cases.len(), 3);
    assert!(cases[0].raw_value.is_some());
    assert_eq!(
        cases[1].associated_values.as_ref().expect("payload"),
        &vec!["msg".to_string(), "code".to_string()]
    );
    assert!(cases[2].raw_value.is_none() && cases[2].associated_values.is_none());
}

// =============================================================================
// Modules
// =============================================================================

#[test]
fn test_import_forms() {
    let program = lower_source(
        "(import \"polyfill\")\n(import utils from \"./utils.hql\")\n\
         (import [parse (emit as emitJs)] from \"compiler\")",
    );
    let NodeKind::ImportDeclaration { specifier, source } = &program.body[0].kind else {
        panic!("expected import");
    };
    assert!(matches!(specifier, ImportSpecifier::SideEffect));
    assert_eq!(source, "polyfill");

    let NodeKind::ImportDeclaration { specifier, source } = &program.body[1].kind else {
        panic!("expected import");
    };
    assert!(matches!(specifier, ImportSpecifier::Namespace { name } if name == "utils"));
    assert_eq!(source, "./utils.js", "relative .hql specifiers compile to .js");

    let NodeKind::ImportDeclaration { specifier, .. } = &program.body[2].kind else {
        panic!("expected import");
    };
    let ImportSpecifier::Named { imports } = specifier else {
        panic!("expected named imports");
    };
    assert_eq!(imports[0], ("parse".to_string(), None));
    assert_eq!(imports[1], ("emit".to_string(), Some("emitJs".to_string())));
}

#[test]
fn test_export_forms() {
    let program = lower_source(
        "(export [a (b as c)])\n(export main)\n(export default (fn [] 1))\n\
         (export (def answer 42))",
    );
    let NodeKind::ExportNamedDeclaration { specifiers } = &program.body[0].kind else {
        panic!("expected named export");
    };
    assert_eq!(specifiers.len(), 2);
    assert_eq!(specifiers[1].exported.as_deref(), Some("c"));
    assert!(matches!(
        program.body[1].kind,
        NodeKind::ExportNamedDeclaration { .. }
    ));
    assert!(matches!(
        program.body[2].kind,
        NodeKind::ExportDefaultDeclaration { .. }
    ));
    let NodeKind::ExportVariableDeclaration { declaration } = &program.body[3].kind else {
        panic!("expected export of declaration");
    };
    assert!(matches!(declaration.kind, NodeKind::VariableDeclaration { .. }));
}

#[test]
fn test_dynamic_import_is_expression() {
    let node = first_expr("(import-dynamic \"./mod.hql\")");
    let NodeKind::DynamicImport { source } = node.kind else {
        panic!("expected dynamic import");
    };
    assert!(matches!(source.kind, NodeKind::StringLiteral { value } if value == "./mod.js"));
}

// =============================================================================
// Data structures, spread, templates, quoting
// =============================================================================

#[test]
fn test_vector_with_spread() {
    let node = first_expr("[1 ...rest 2]");
    let NodeKind::ArrayExpression { elements } = node.kind else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert!(matches!(elements[1].kind, NodeKind::SpreadElement { .. }));
}

#[test]
fn test_hash_map_without_spread_is_helper_call() {
    let node = first_expr("{a 1 b 2}");
    let NodeKind::CallExpression { callee, arguments } = node.kind else {
        panic!("expected helper call");
    };
    assert!(
        matches!(&callee.kind, NodeKind::Identifier { name } if name == "__hql_hash_map")
    );
    assert_eq!(arguments.len(), 4);
}

#[test]
fn test_hash_map_with_spread_is_object_literal() {
    let node = first_expr("{a 1 ...more}");
    let NodeKind::ObjectExpression { properties } = node.kind else {
        panic!("expected object literal");
    };
    assert_eq!(properties.len(), 2);
    assert!(matches!(properties[0], ObjectProperty::KeyValue { .. }));
    assert!(matches!(properties[1], ObjectProperty::SpreadAssignment { .. }));
}

#[test]
fn test_hash_map_odd_arity_is_error() {
    let err = lower_error("{a 1 b}");
    assert!(err.expected.contains("even number"), "{err}");
}

#[test]
fn test_hash_set_is_new_set() {
    let node = first_expr("(hash-set 1 2)");
    let NodeKind::NewExpression { callee, .. } = node.kind else {
        panic!("expected new expression");
    };
    assert!(matches!(&callee.kind, NodeKind::Identifier { name } if name == "Set"));
}

#[test]
fn test_template_literal_invariant() {
    let node = first_expr("\"sum ${(+ 1 2)} of ${n}\"");
    let NodeKind::TemplateLiteral { quasis, expressions } = node.kind else {
        panic!("expected template literal");
    };
    assert_eq!(quasis.len(), expressions.len() + 1);
    assert_eq!(quasis, vec!["sum ".to_string(), " of ".to_string(), String::new()]);
}

#[test]
fn test_quote_serializes_ast() {
    let node = first_expr("'(a 1 [b])");
    let NodeKind::ArrayExpression { elements } = node.kind else {
        panic!("expected array");
    };
    assert!(matches!(&elements[0].kind, NodeKind::StringLiteral { value } if value == "a"));
    assert!(matches!(elements[1].kind, NodeKind::NumericLiteral { value } if value == 1.0));
    let NodeKind::ArrayExpression { elements: inner } = &elements[2].kind else {
        panic!("expected nested array");
    };
    assert!(matches!(&inner[0].kind, NodeKind::StringLiteral { value } if value == "b"));
}

#[test]
fn test_quasiquote_unquote_and_splice() {
    let node = first_expr("`(a ~x ~@xs)");
    let NodeKind::ArrayExpression { elements } = node.kind else {
        panic!("expected array");
    };
    assert!(matches!(&elements[0].kind, NodeKind::StringLiteral { value } if value == "a"));
    assert!(matches!(&elements[1].kind, NodeKind::Identifier { name } if name == "x"));
    assert!(matches!(elements[2].kind, NodeKind::SpreadElement { .. }));
}

#[test]
fn test_bare_unquote_is_error() {
    let err = lower_error("~x");
    assert!(err.expected.contains("quasiquote"), "{err}");
}

// =============================================================================
// JS interop
// =============================================================================

#[test]
fn test_js_get_identifier_key_is_dot_access() {
    let node = first_expr("(js-get obj \"name\")");
    let NodeKind::MemberExpression { computed, .. } = node.kind else {
        panic!("expected member expression");
    };
    assert!(!computed);
}

#[test]
fn test_js_get_computed_key() {
    let node = first_expr("(js-get obj \"two words\")");
    let NodeKind::MemberExpression { computed, property, .. } = node.kind else {
        panic!("expected member expression");
    };
    assert!(computed);
    assert!(matches!(property.kind, NodeKind::StringLiteral { .. }));
}

#[test]
fn test_js_set_is_assignment() {
    let node = first_expr("(js-set obj \"x\" 1)");
    assert!(matches!(node.kind, NodeKind::AssignmentExpression { .. }));
}

#[test]
fn test_js_call_and_method() {
    let node = first_expr("(js-call obj \"slice\" 1 2)");
    let NodeKind::CallMemberExpression { property, arguments, .. } = node.kind else {
        panic!("expected call-member expression");
    };
    assert_eq!(property, "slice");
    assert_eq!(arguments.len(), 2);

    let node = first_expr("(js-method obj \"bindMe\")");
    assert!(matches!(node.kind, NodeKind::JsMethodAccess { method, .. } if method == "bindMe"));
}

#[test]
fn test_assignment_to_member_path() {
    let node = first_expr("(= obj.field 5)");
    let NodeKind::AssignmentExpression { target, .. } = node.kind else {
        panic!("expected assignment");
    };
    assert!(
        matches!(target.kind, NodeKind::MemberExpression { .. }),
        "assignment targets use member access, not guarded access"
    );
}

// =============================================================================
// deftype / interface
// =============================================================================

#[test]
fn test_deftype_carries_raw_body_and_generics() {
    let node = first_node("(deftype \"Result<T, E>\" \"{ ok: T } | { err: E }\")");
    let NodeKind::TypeAliasDeclaration { id, type_parameters, body } = &node.kind else {
        panic!("expected type alias");
    };
    assert_eq!(id, "Result");
    assert_eq!(type_parameters, &vec!["T".to_string(), "E".to_string()]);
    assert!(body.contains("ok: T"));
}

#[test]
fn test_interface_with_extends() {
    let node = first_node("(interface Shape (extends Base Drawable) \"{ area(): number }\")");
    let NodeKind::InterfaceDeclaration { id, extends, .. } = &node.kind else {
        panic!("expected interface");
    };
    assert_eq!(id, "Shape");
    assert_eq!(extends, &vec!["Base".to_string(), "Drawable".to_string()]);
}

// =============================================================================
// Error propagation
// =============================================================================

#[test]
fn test_first_failing_form_aborts_lowering() {
    // The bad form comes second; the error reports it, and nothing after
    // is attempted (a later error would differ).
    let err = lower_error("(def ok 1) {a 1 b} (def unreachable 2)");
    assert!(err.expected.contains("even number"), "{err}");
}

#[test]
fn test_errors_carry_positions() {
    let err = lower_error("(def a 1)\n  (throw)");
    let pos = err.pos.expect("position attached");
    assert_eq!(pos.line, 2);
}
