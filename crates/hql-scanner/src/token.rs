//! Token types produced by the scanner.

use hql_common::{Position, Span};
use serde::{Deserialize, Serialize};

/// The kind of a scanned token, with any literal payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `'` reader macro
    Quote,
    /// `` ` `` reader macro
    Quasiquote,
    /// `~` reader macro
    Unquote,
    /// `~@` reader macro
    UnquoteSplicing,
    /// A double-quoted string with escapes already processed.
    Str(String),
    /// A numeric literal. `bigint` is set for a trailing `n` suffix, in
    /// which case `raw` holds the digits without the suffix.
    Num {
        value: f64,
        raw: String,
        bigint: bool,
    },
    /// A symbol (identifiers, operators, dot-paths, `js/` names, ...).
    Sym(String),
}

impl TokenKind {
    /// Short human-readable description for diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Quote => "quote",
            TokenKind::Quasiquote => "quasiquote",
            TokenKind::Unquote => "unquote",
            TokenKind::UnquoteSplicing => "unquote-splicing",
            TokenKind::Str(_) => "string literal",
            TokenKind::Num { .. } => "number literal",
            TokenKind::Sym(_) => "symbol",
        }
    }
}

/// A scanned token with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub pos: Position,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, span: Span, pos: Position) -> Self {
        Self { kind, span, pos }
    }
}
