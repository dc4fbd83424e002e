//! IR node definitions.
//!
//! A [`Node`] is a kind plus the source position it was lowered from.
//! Synthesized nodes (IIFE wrappers, sentinel throws) take the position of
//! the enclosing form.

use hql_common::Position;
use serde::{Deserialize, Serialize};

use crate::ops::{AssignOp, BinaryOp, LogicalOp, UnaryOp, UpdateOp};

/// A lowered program: the sequence of top-level IR nodes.
///
/// Invariant: every element is a declaration/statement kind or an
/// `ExpressionStatement`; bare expressions never appear at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Node>,
}

/// Declaration kind for variable declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Const,
    Let,
    Var,
}

impl DeclarationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Const => "const",
            DeclarationKind::Let => "let",
            DeclarationKind::Var => "var",
        }
    }
}

/// A binding-position pattern.
///
/// Simple bindings use `Identifier`; destructuring bindings use the
/// `Array`/`Object` variants and never a bare `Identifier` at the root.
/// Rest targets are always identifiers, `Skip` is an elided element, and
/// `Default` attaches a fallback expression to an inner pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Identifier {
        name: String,
    },
    Array {
        /// Elements in order; a trailing `Rest` consumes the remainder.
        elements: Vec<Pattern>,
    },
    Object {
        entries: Vec<ObjectPatternEntry>,
        rest: Option<String>,
    },
    Rest {
        name: String,
    },
    Skip,
    Default {
        pattern: Box<Pattern>,
        default: Box<Node>,
    },
}

impl Pattern {
    /// Whether this pattern is a plain identifier (a non-destructuring
    /// binding).
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        matches!(self, Pattern::Identifier { .. })
    }

    /// All names bound by this pattern, in binding order.
    #[must_use]
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Identifier { name } | Pattern::Rest { name } => out.push(name),
            Pattern::Array { elements } => {
                for element in elements {
                    element.collect_names(out);
                }
            }
            Pattern::Object { entries, rest } => {
                for entry in entries {
                    entry.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    out.push(rest);
                }
            }
            Pattern::Skip => {}
            Pattern::Default { pattern, .. } => pattern.collect_names(out),
        }
    }
}

/// One `{key: binding}` entry of an object pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatternEntry {
    /// Property key on the source object.
    pub key: String,
    /// Binding for the value: an identifier alias, a nested pattern, or a
    /// `Default`-wrapped pattern.
    pub value: Pattern,
}

/// A function parameter: a pattern with an optional default and an
/// optional type annotation extracted from `name:Type` surface syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub pattern: Pattern,
    pub default: Option<Node>,
    pub type_annotation: Option<String>,
}

impl Param {
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            pattern: Pattern::Identifier { name: name.into() },
            default: None,
            type_annotation: None,
        }
    }
}

/// One declarator of a variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub id: Pattern,
    pub init: Option<Node>,
    pub type_annotation: Option<String>,
}

/// A property of an object expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectProperty {
    KeyValue {
        key: String,
        value: Node,
        computed: bool,
    },
    /// `...expr` inside an object literal.
    SpreadAssignment { argument: Node },
}

/// `catch (param) { ... }`. A missing param is ES2019 optional binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Option<String>,
    pub body: Box<Node>,
}

/// A class field (including private `#name` fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassField {
    pub name: String,
    pub value: Option<Node>,
    pub mutable: bool,
    pub is_static: bool,
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

/// A class method, getter or setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMethod {
    pub name: String,
    pub kind: MethodKind,
    pub params: Vec<Param>,
    pub body: Box<Node>,
    pub is_static: bool,
    pub is_async: bool,
    pub is_generator: bool,
}

/// The class constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConstructor {
    pub params: Vec<Param>,
    pub body: Box<Node>,
}

/// One case of an `enum` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumCase {
    pub name: String,
    /// Literal raw value (`(case ok 200)`).
    pub raw_value: Option<Node>,
    /// Positional payload names (`(case point x y)`).
    pub associated_values: Option<Vec<String>>,
}

/// The specifier side of an import declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportSpecifier {
    /// `(import "module")`
    SideEffect,
    /// `(import name from "module")`
    Namespace { name: String },
    /// `(import [a b (c as d)] from "module")`
    Named { imports: Vec<(String, Option<String>)> },
}

/// One name of an `(export [...])` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: Option<String>,
}

/// An IR node: a kind plus the source position it was lowered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // =========================================================================
    // Expressions
    // =========================================================================
    Identifier {
        name: String,
    },
    StringLiteral {
        value: String,
    },
    NumericLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    BigIntLiteral {
        /// Digits without the `n` suffix.
        value: String,
    },
    /// Invariant: `quasis.len() == expressions.len() + 1`.
    TemplateLiteral {
        quasis: Vec<String>,
        expressions: Vec<Node>,
    },
    ArrayExpression {
        elements: Vec<Node>,
    },
    ObjectExpression {
        properties: Vec<ObjectProperty>,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    NewExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    /// One `?.` step of an optional chain. The optional bit sits on the
    /// specific step that was `?.`; plain steps use `MemberExpression`.
    OptionalMemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    /// `obj.method(args)` in one node, used by the JS interop lowerings.
    CallMemberExpression {
        object: Box<Node>,
        property: String,
        arguments: Vec<Node>,
    },
    BinaryExpression {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    LogicalExpression {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryExpression {
        op: UnaryOp,
        argument: Box<Node>,
        prefix: bool,
    },
    UpdateExpression {
        op: UpdateOp,
        argument: Box<Node>,
        prefix: bool,
    },
    AssignmentExpression {
        op: AssignOp,
        target: Box<Node>,
        value: Box<Node>,
    },
    ConditionalExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    AwaitExpression {
        argument: Box<Node>,
    },
    YieldExpression {
        argument: Option<Box<Node>>,
        delegate: bool,
    },
    FunctionExpression {
        id: Option<String>,
        params: Vec<Param>,
        body: Box<Node>,
        is_async: bool,
        is_generator: bool,
    },
    /// `...expr` in array or call position.
    SpreadElement {
        argument: Box<Node>,
    },
    /// Guarded dot-path access: carries the base object and the property
    /// path so the emitter can emit a null-safe accessor IIFE.
    InteropIIFE {
        object: Box<Node>,
        property_path: Vec<String>,
    },
    /// A method reference that the emitter binds to its receiver.
    JsMethodAccess {
        object: Box<Node>,
        method: String,
    },

    // =========================================================================
    // Statements
    // =========================================================================
    ExpressionStatement {
        expression: Box<Node>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    ReturnStatement {
        argument: Option<Box<Node>>,
    },
    ThrowStatement {
        argument: Box<Node>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    ForOfStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
        is_await: bool,
    },
    LabeledStatement {
        label: String,
        body: Box<Node>,
    },
    BreakStatement {
        label: Option<String>,
    },
    ContinueStatement {
        label: Option<String>,
    },
    TryStatement {
        block: Box<Node>,
        handler: Option<CatchClause>,
        finalizer: Option<Box<Node>>,
    },
    VariableDeclaration {
        kind: DeclarationKind,
        declarators: Vec<VariableDeclarator>,
    },

    // =========================================================================
    // Declarations
    // =========================================================================
    FunctionDeclaration {
        id: String,
        params: Vec<Param>,
        body: Box<Node>,
        is_async: bool,
        is_generator: bool,
    },
    /// Named-lambda variant: `(let f (fn ...))` hoisted as a declaration.
    FnFunctionDeclaration {
        id: String,
        params: Vec<Param>,
        body: Box<Node>,
        is_async: bool,
        is_generator: bool,
    },
    ClassDeclaration {
        id: String,
        superclass: Option<Box<Node>>,
        fields: Vec<ClassField>,
        constructor: Option<ClassConstructor>,
        methods: Vec<ClassMethod>,
    },
    EnumDeclaration {
        id: String,
        raw_type: Option<String>,
        cases: Vec<EnumCase>,
        has_associated_values: bool,
    },
    ImportDeclaration {
        specifier: ImportSpecifier,
        source: String,
    },
    ExportNamedDeclaration {
        specifiers: Vec<ExportSpecifier>,
    },
    ExportVariableDeclaration {
        declaration: Box<Node>,
    },
    ExportDefaultDeclaration {
        declaration: Box<Node>,
    },
    DynamicImport {
        source: Box<Node>,
    },
    TypeAliasDeclaration {
        id: String,
        type_parameters: Vec<String>,
        /// Raw type expression text, passed through to the emitter.
        body: String,
    },
    InterfaceDeclaration {
        id: String,
        type_parameters: Vec<String>,
        extends: Vec<String>,
        /// Raw body text, passed through to the emitter.
        body: String,
    },
}

impl Node {
    #[must_use]
    pub fn new(kind: NodeKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    // =========================================================================
    // Constructors for common nodes
    // =========================================================================

    #[must_use]
    pub fn identifier(name: impl Into<String>, pos: Position) -> Self {
        Self::new(NodeKind::Identifier { name: name.into() }, pos)
    }

    #[must_use]
    pub fn string(value: impl Into<String>, pos: Position) -> Self {
        Self::new(
            NodeKind::StringLiteral {
                value: value.into(),
            },
            pos,
        )
    }

    #[must_use]
    pub fn number(value: f64, pos: Position) -> Self {
        Self::new(NodeKind::NumericLiteral { value }, pos)
    }

    #[must_use]
    pub fn boolean(value: bool, pos: Position) -> Self {
        Self::new(NodeKind::BooleanLiteral { value }, pos)
    }

    #[must_use]
    pub fn null(pos: Position) -> Self {
        Self::new(NodeKind::NullLiteral, pos)
    }

    #[must_use]
    pub fn call(callee: Node, arguments: Vec<Node>, pos: Position) -> Self {
        Self::new(
            NodeKind::CallExpression {
                callee: Box::new(callee),
                arguments,
            },
            pos,
        )
    }

    /// Call a runtime helper by name.
    #[must_use]
    pub fn helper_call(helper: &str, arguments: Vec<Node>, pos: Position) -> Self {
        Self::call(Self::identifier(helper, pos.clone()), arguments, pos)
    }

    #[must_use]
    pub fn member(object: Node, property: Node, computed: bool, pos: Position) -> Self {
        Self::new(
            NodeKind::MemberExpression {
                object: Box::new(object),
                property: Box::new(property),
                computed,
            },
            pos,
        )
    }

    #[must_use]
    pub fn block(body: Vec<Node>, pos: Position) -> Self {
        Self::new(NodeKind::BlockStatement { body }, pos)
    }

    #[must_use]
    pub fn ret(argument: Option<Node>, pos: Position) -> Self {
        Self::new(
            NodeKind::ReturnStatement {
                argument: argument.map(Box::new),
            },
            pos,
        )
    }

    #[must_use]
    pub fn expr_stmt(expression: Node, pos: Position) -> Self {
        Self::new(
            NodeKind::ExpressionStatement {
                expression: Box::new(expression),
            },
            pos,
        )
    }

    /// A zero-argument function expression over `body`.
    #[must_use]
    pub fn function_expr(
        body: Node,
        is_async: bool,
        is_generator: bool,
        pos: Position,
    ) -> Self {
        Self::new(
            NodeKind::FunctionExpression {
                id: None,
                params: Vec::new(),
                body: Box::new(body),
                is_async,
                is_generator,
            },
            pos,
        )
    }

    /// An IIFE: `(() => { body })()`, optionally async/generator. The
    /// caller wraps the result in await / yield* as needed.
    #[must_use]
    pub fn iife(body: Node, is_async: bool, is_generator: bool, pos: Position) -> Self {
        Self::call(
            Self::function_expr(body, is_async, is_generator, pos.clone()),
            Vec::new(),
            pos,
        )
    }

    /// Whether this node is an expression kind (vs statement/declaration).
    #[must_use]
    pub fn is_expression(&self) -> bool {
        crate::classify::is_expression(&self.kind)
    }
}
