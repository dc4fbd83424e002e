//! IR tree walking.
//!
//! [`for_each_child`] visits every direct child node of a kind, including
//! the expressions tucked inside patterns, params, object properties and
//! class members. [`walk`] is the preorder closure over it.

use crate::node::{Node, NodeKind, ObjectProperty, Param, Pattern};

fn visit_pattern<'a>(pattern: &'a Pattern, f: &mut impl FnMut(&'a Node)) {
    match pattern {
        Pattern::Identifier { .. } | Pattern::Rest { .. } | Pattern::Skip => {}
        Pattern::Array { elements } => {
            for element in elements {
                visit_pattern(element, f);
            }
        }
        Pattern::Object { entries, .. } => {
            for entry in entries {
                visit_pattern(&entry.value, f);
            }
        }
        Pattern::Default { pattern, default } => {
            visit_pattern(pattern, f);
            f(default);
        }
    }
}

fn visit_params<'a>(params: &'a [Param], f: &mut impl FnMut(&'a Node)) {
    for param in params {
        visit_pattern(&param.pattern, f);
        if let Some(default) = &param.default {
            f(default);
        }
    }
}

/// Call `f` on every direct child node of `kind`.
pub fn for_each_child<'a>(kind: &'a NodeKind, f: &mut impl FnMut(&'a Node)) {
    match kind {
        NodeKind::Identifier { .. }
        | NodeKind::StringLiteral { .. }
        | NodeKind::NumericLiteral { .. }
        | NodeKind::BooleanLiteral { .. }
        | NodeKind::NullLiteral
        | NodeKind::BigIntLiteral { .. }
        | NodeKind::BreakStatement { .. }
        | NodeKind::ContinueStatement { .. }
        | NodeKind::ImportDeclaration { .. }
        | NodeKind::ExportNamedDeclaration { .. }
        | NodeKind::TypeAliasDeclaration { .. }
        | NodeKind::InterfaceDeclaration { .. } => {}

        NodeKind::TemplateLiteral { expressions, .. } => {
            for expression in expressions {
                f(expression);
            }
        }
        NodeKind::ArrayExpression { elements } => {
            for element in elements {
                f(element);
            }
        }
        NodeKind::ObjectExpression { properties } => {
            for property in properties {
                match property {
                    ObjectProperty::KeyValue { value, .. } => f(value),
                    ObjectProperty::SpreadAssignment { argument } => f(argument),
                }
            }
        }
        NodeKind::CallExpression { callee, arguments }
        | NodeKind::NewExpression { callee, arguments } => {
            f(callee);
            for argument in arguments {
                f(argument);
            }
        }
        NodeKind::MemberExpression {
            object, property, ..
        }
        | NodeKind::OptionalMemberExpression {
            object, property, ..
        } => {
            f(object);
            f(property);
        }
        NodeKind::CallMemberExpression {
            object, arguments, ..
        } => {
            f(object);
            for argument in arguments {
                f(argument);
            }
        }
        NodeKind::BinaryExpression { left, right, .. }
        | NodeKind::LogicalExpression { left, right, .. } => {
            f(left);
            f(right);
        }
        NodeKind::UnaryExpression { argument, .. }
        | NodeKind::UpdateExpression { argument, .. }
        | NodeKind::AwaitExpression { argument }
        | NodeKind::SpreadElement { argument }
        | NodeKind::ThrowStatement { argument } => f(argument),
        NodeKind::AssignmentExpression { target, value, .. } => {
            f(target);
            f(value);
        }
        NodeKind::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            f(test);
            f(consequent);
            f(alternate);
        }
        NodeKind::YieldExpression { argument, .. } => {
            if let Some(argument) = argument {
                f(argument);
            }
        }
        NodeKind::FunctionExpression { params, body, .. }
        | NodeKind::FunctionDeclaration { params, body, .. }
        | NodeKind::FnFunctionDeclaration { params, body, .. } => {
            visit_params(params, f);
            f(body);
        }
        NodeKind::InteropIIFE { object, .. } | NodeKind::JsMethodAccess { object, .. } => {
            f(object);
        }

        NodeKind::ExpressionStatement { expression } => f(expression),
        NodeKind::BlockStatement { body } => {
            for node in body {
                f(node);
            }
        }
        NodeKind::ReturnStatement { argument } => {
            if let Some(argument) = argument {
                f(argument);
            }
        }
        NodeKind::IfStatement {
            test,
            consequent,
            alternate,
        } => {
            f(test);
            f(consequent);
            if let Some(alternate) = alternate {
                f(alternate);
            }
        }
        NodeKind::WhileStatement { test, body } => {
            f(test);
            f(body);
        }
        NodeKind::ForStatement {
            init,
            test,
            update,
            body,
        } => {
            if let Some(init) = init {
                f(init);
            }
            if let Some(test) = test {
                f(test);
            }
            if let Some(update) = update {
                f(update);
            }
            f(body);
        }
        NodeKind::ForOfStatement {
            left, right, body, ..
        } => {
            f(left);
            f(right);
            f(body);
        }
        NodeKind::LabeledStatement { body, .. } => f(body),
        NodeKind::TryStatement {
            block,
            handler,
            finalizer,
        } => {
            f(block);
            if let Some(handler) = handler {
                f(&handler.body);
            }
            if let Some(finalizer) = finalizer {
                f(finalizer);
            }
        }
        NodeKind::VariableDeclaration { declarators, .. } => {
            for declarator in declarators {
                visit_pattern(&declarator.id, f);
                if let Some(init) = &declarator.init {
                    f(init);
                }
            }
        }

        NodeKind::ClassDeclaration {
            superclass,
            fields,
            constructor,
            methods,
            ..
        } => {
            if let Some(superclass) = superclass {
                f(superclass);
            }
            for field in fields {
                if let Some(value) = &field.value {
                    f(value);
                }
            }
            if let Some(constructor) = constructor {
                visit_params(&constructor.params, f);
                f(&constructor.body);
            }
            for method in methods {
                visit_params(&method.params, f);
                f(&method.body);
            }
        }
        NodeKind::EnumDeclaration { cases, .. } => {
            for case in cases {
                if let Some(raw) = &case.raw_value {
                    f(raw);
                }
            }
        }
        NodeKind::ExportVariableDeclaration { declaration }
        | NodeKind::ExportDefaultDeclaration { declaration } => f(declaration),
        NodeKind::DynamicImport { source } => f(source),
    }
}

/// Preorder walk of the whole subtree rooted at `node`, including `node`.
pub fn walk<'a>(node: &'a Node, f: &mut impl FnMut(&'a Node)) {
    f(node);
    for_each_child(&node.kind, &mut |child| walk(child, f));
}

/// Whether any node in the subtree satisfies `pred`. Does not descend into
/// nested function bodies when `enter_functions` is false, which is what
/// await/yield containment checks need (an inner function owns its own
/// async/generator marking).
pub fn any_in_tree(node: &Node, enter_functions: bool, pred: &impl Fn(&Node) -> bool) -> bool {
    if pred(node) {
        return true;
    }
    let mut found = false;
    for_each_child(&node.kind, &mut |child| {
        if found {
            return;
        }
        if !enter_functions
            && matches!(
                child.kind,
                NodeKind::FunctionExpression { .. }
                    | NodeKind::FunctionDeclaration { .. }
                    | NodeKind::FnFunctionDeclaration { .. }
            )
        {
            return;
        }
        if any_in_tree(child, enter_functions, pred) {
            found = true;
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};
    use hql_common::Position;

    #[test]
    fn walk_visits_nested_nodes() {
        let pos = Position::synthetic();
        let tree = Node::call(
            Node::identifier("f", pos.clone()),
            vec![Node::number(1.0, pos.clone()), Node::number(2.0, pos.clone())],
            pos,
        );
        let mut count = 0;
        walk(&tree, &mut |_| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn any_in_tree_stops_at_function_boundaries() {
        let pos = Position::synthetic();
        let await_node = Node::new(
            NodeKind::AwaitExpression {
                argument: Box::new(Node::number(1.0, pos.clone())),
            },
            pos.clone(),
        );
        let inner_fn = Node::function_expr(
            Node::block(vec![Node::expr_stmt(await_node, pos.clone())], pos.clone()),
            true,
            false,
            pos.clone(),
        );
        let tree = Node::call(inner_fn, vec![], pos);
        let is_await = |n: &Node| matches!(n.kind, NodeKind::AwaitExpression { .. });
        assert!(!any_in_tree(&tree, false, &is_await));
        assert!(any_in_tree(&tree, true, &is_await));
    }
}
