//! AST node types produced by the reader.
//!
//! The AST is deliberately small: a node is a literal, a symbol, or a list.
//! Symbols may encode sub-syntax in their names (dot-method heads, `js/`
//! passthrough, type annotations, spread markers); decoding those is the
//! lowering pipeline's job, not the reader's.

use hql_common::Position;
use serde::{Deserialize, Serialize};

/// Which surface syntax a list node came from. Immutable after read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    /// `( ... )`
    Parens,
    /// `[ ... ]` — the reader prepends the `vector` head symbol.
    VectorLiteral,
    /// `{ ... }` — the reader prepends the `hash-map` head symbol.
    MapLiteral,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    /// Digits of a bigint literal, without the `n` suffix.
    BigInt(String),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Symbol(String),
    List { children: Vec<Expr>, kind: ListKind },
}

/// An AST node with its source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
}

impl Expr {
    #[must_use]
    pub fn literal(literal: Literal, pos: Position) -> Self {
        Self {
            kind: ExprKind::Literal(literal),
            pos,
        }
    }

    #[must_use]
    pub fn symbol(name: impl Into<String>, pos: Position) -> Self {
        Self {
            kind: ExprKind::Symbol(name.into()),
            pos,
        }
    }

    #[must_use]
    pub fn list(children: Vec<Expr>, pos: Position) -> Self {
        Self {
            kind: ExprKind::List {
                children,
                kind: ListKind::Parens,
            },
            pos,
        }
    }

    #[must_use]
    pub fn list_with_kind(children: Vec<Expr>, kind: ListKind, pos: Position) -> Self {
        Self {
            kind: ExprKind::List { children, kind },
            pos,
        }
    }

    /// The symbol name, if this node is a symbol.
    #[must_use]
    pub fn symbol_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this node is the symbol `name`.
    #[must_use]
    pub fn is_symbol(&self, name: &str) -> bool {
        self.symbol_name() == Some(name)
    }

    /// The children, if this node is a list (of any provenance).
    #[must_use]
    pub fn list_children(&self) -> Option<&[Expr]> {
        match &self.kind {
            ExprKind::List { children, .. } => Some(children),
            _ => None,
        }
    }

    /// The list provenance, if this node is a list.
    #[must_use]
    pub fn list_kind(&self) -> Option<ListKind> {
        match &self.kind {
            ExprKind::List { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this node is a list whose head is the symbol `name`.
    #[must_use]
    pub fn is_form(&self, name: &str) -> bool {
        self.list_children()
            .and_then(|c| c.first())
            .is_some_and(|head| head.is_symbol(name))
    }

    /// The string value, if this node is a string literal.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Literal(Literal::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, if this node is a number literal.
    #[must_use]
    pub fn number_value(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Literal(Literal::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Short description of the node for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.kind {
            ExprKind::Literal(Literal::Null) => "null".to_string(),
            ExprKind::Literal(Literal::Bool(b)) => format!("`{b}`"),
            ExprKind::Literal(Literal::Number(n)) => format!("number `{n}`"),
            ExprKind::Literal(Literal::BigInt(raw)) => format!("bigint `{raw}n`"),
            ExprKind::Literal(Literal::Str(_)) => "string literal".to_string(),
            ExprKind::Symbol(name) => format!("symbol `{name}`"),
            ExprKind::List { kind, .. } => match kind {
                ListKind::Parens => "list".to_string(),
                ListKind::VectorLiteral => "vector literal".to_string(),
                ListKind::MapLiteral => "map literal".to_string(),
            },
        }
    }
}
