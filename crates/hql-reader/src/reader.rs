//! The reader: token stream to AST, with reader-macro expansion and
//! balanced-delimiter diagnostics.

use std::sync::Arc;

use hql_common::limits::MAX_READER_DEPTH;
use hql_common::{DelimiterKind, ParseError, ParseErrorKind, Position};
use hql_scanner::{Scanner, Token, TokenKind};

use crate::ast::{Expr, ListKind, Literal};

/// Read HQL source text into a sequence of top-level AST nodes.
pub fn read(source: &str, file_path: &str) -> Result<Vec<Expr>, ParseError> {
    let tokens = Scanner::new(source, file_path).tokenize()?;
    Reader::new(tokens, file_path).parse_program()
}

struct Reader {
    tokens: Vec<Token>,
    index: usize,
    file: Arc<str>,
}

impl Reader {
    fn new(tokens: Vec<Token>, file_path: &str) -> Self {
        Self {
            tokens,
            index: 0,
            file: Arc::from(file_path),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned()?;
        self.index += 1;
        Some(token)
    }

    /// Position just past the last token, for EOF diagnostics.
    fn eof_pos(&self) -> Position {
        self.tokens
            .last()
            .map(|t| t.pos.clone())
            .unwrap_or_else(|| Position::new(1, 0, Arc::clone(&self.file)))
    }

    fn parse_program(mut self) -> Result<Vec<Expr>, ParseError> {
        let mut forms = Vec::new();
        while self.peek().is_some() {
            forms.push(self.parse_expr(0)?);
        }
        Ok(forms)
    }

    fn parse_expr(&mut self, depth: usize) -> Result<Expr, ParseError> {
        if depth > MAX_READER_DEPTH {
            let pos = self
                .peek()
                .map(|t| t.pos.clone())
                .unwrap_or_else(|| self.eof_pos());
            return Err(ParseError::new(
                ParseErrorKind::TooDeep,
                pos,
                format!("nesting deeper than {MAX_READER_DEPTH} levels"),
            ));
        }

        let token = match self.advance() {
            Some(token) => token,
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::BadString,
                    self.eof_pos(),
                    "unexpected end of input",
                ));
            }
        };

        match token.kind {
            TokenKind::LParen => {
                let children = self.parse_until(DelimiterKind::List, &token.pos, depth)?;
                Ok(Expr::list_with_kind(children, ListKind::Parens, token.pos))
            }
            TokenKind::LBracket => {
                let items = self.parse_until(DelimiterKind::Vector, &token.pos, depth)?;
                let mut children = Vec::with_capacity(items.len() + 1);
                children.push(Expr::symbol("vector", token.pos.clone()));
                children.extend(items);
                Ok(Expr::list_with_kind(
                    children,
                    ListKind::VectorLiteral,
                    token.pos,
                ))
            }
            TokenKind::LBrace => {
                let items = self.parse_until(DelimiterKind::Map, &token.pos, depth)?;
                let mut children = Vec::with_capacity(items.len() + 1);
                children.push(Expr::symbol("hash-map", token.pos.clone()));
                children.extend(items);
                Ok(Expr::list_with_kind(
                    children,
                    ListKind::MapLiteral,
                    token.pos,
                ))
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                let delimiter = match token.kind {
                    TokenKind::RParen => ')',
                    TokenKind::RBracket => ']',
                    _ => '}',
                };
                Err(ParseError::unexpected_close(token.pos, delimiter))
            }
            TokenKind::Quote => self.expand_reader_macro("quote", token.pos, depth),
            TokenKind::Quasiquote => self.expand_reader_macro("quasiquote", token.pos, depth),
            TokenKind::Unquote => self.expand_reader_macro("unquote", token.pos, depth),
            TokenKind::UnquoteSplicing => {
                self.expand_reader_macro("unquote-splicing", token.pos, depth)
            }
            TokenKind::Str(value) => self.parse_string(value, token.pos),
            TokenKind::Num { value, raw, bigint } => {
                let literal = if bigint {
                    Literal::BigInt(raw)
                } else {
                    Literal::Number(value)
                };
                Ok(Expr::literal(literal, token.pos))
            }
            TokenKind::Sym(name) => Ok(match name.as_str() {
                "true" => Expr::literal(Literal::Bool(true), token.pos),
                "false" => Expr::literal(Literal::Bool(false), token.pos),
                "null" => Expr::literal(Literal::Null, token.pos),
                _ => Expr::symbol(name, token.pos),
            }),
        }
    }

    /// Parse items until the matching close delimiter for `which`.
    fn parse_until(
        &mut self,
        which: DelimiterKind,
        opened_at: &Position,
        depth: usize,
    ) -> Result<Vec<Expr>, ParseError> {
        let expected_close = match which {
            DelimiterKind::List => TokenKind::RParen,
            DelimiterKind::Vector => TokenKind::RBracket,
            DelimiterKind::Map => TokenKind::RBrace,
        };
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::unclosed(
                        which,
                        opened_at.clone(),
                        self.eof_pos(),
                    ));
                }
                Some(token) if token.kind == expected_close => {
                    self.advance();
                    return Ok(items);
                }
                Some(token)
                    if matches!(
                        token.kind,
                        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
                    ) =>
                {
                    // A closer for some *other* delimiter family: the stray
                    // close is the error, not the enclosing open.
                    let delimiter = match token.kind {
                        TokenKind::RParen => ')',
                        TokenKind::RBracket => ']',
                        _ => '}',
                    };
                    return Err(ParseError::unexpected_close(token.pos.clone(), delimiter));
                }
                Some(_) => items.push(self.parse_expr(depth + 1)?),
            }
        }
    }

    /// `'x` -> `(quote x)` and friends. The synthesized head symbol carries
    /// the macro token's position.
    fn expand_reader_macro(
        &mut self,
        name: &str,
        pos: Position,
        depth: usize,
    ) -> Result<Expr, ParseError> {
        if self.peek().is_none() {
            return Err(ParseError::new(
                ParseErrorKind::BadString,
                pos,
                format!("`{name}` reader macro needs a following form"),
            ));
        }
        let inner = self.parse_expr(depth + 1)?;
        Ok(Expr::list(
            vec![Expr::symbol(name, pos.clone()), inner],
            pos,
        ))
    }

    /// A plain string stays a literal; a string containing `${...}`
    /// interpolation becomes `(template-literal piece ...)` with alternating
    /// string pieces and embedded expressions. Every piece carries the
    /// position of the string's opening quote.
    fn parse_string(&self, value: String, pos: Position) -> Result<Expr, ParseError> {
        if !value.contains("${") {
            return Ok(Expr::literal(Literal::Str(value), pos));
        }

        let mut pieces = vec![Expr::symbol("template-literal", pos.clone())];
        let mut rest = value.as_str();
        while let Some(start) = rest.find("${") {
            let (text, after) = rest.split_at(start);
            if !text.is_empty() {
                pieces.push(Expr::literal(Literal::Str(text.to_string()), pos.clone()));
            }
            let inner = &after[2..];
            let end = find_interpolation_end(inner).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::BadString,
                    pos.clone(),
                    "unterminated `${` interpolation in string literal",
                )
            })?;
            let snippet = &inner[..end];
            pieces.push(self.read_interpolation(snippet, &pos)?);
            rest = &inner[end + 1..];
        }
        if !rest.is_empty() {
            pieces.push(Expr::literal(Literal::Str(rest.to_string()), pos.clone()));
        }
        Ok(Expr::list(pieces, pos))
    }

    fn read_interpolation(&self, snippet: &str, pos: &Position) -> Result<Expr, ParseError> {
        let mut forms = read(snippet, &self.file)?;
        if forms.len() != 1 {
            return Err(ParseError::new(
                ParseErrorKind::BadString,
                pos.clone(),
                format!(
                    "string interpolation must contain exactly one expression, found {}",
                    forms.len()
                ),
            ));
        }
        let mut form = forms.remove(0);
        reposition(&mut form, pos);
        Ok(form)
    }
}

/// Find the byte offset of the `}` closing an interpolation, honoring
/// nested braces and skipping string literals inside the expression.
fn find_interpolation_end(s: &str) -> Option<usize> {
    let mut brace_depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => brace_depth += 1,
            '}' => {
                if brace_depth == 0 {
                    return Some(i);
                }
                brace_depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Interpolated expressions are re-read from a snippet, so their positions
/// are relative to that snippet; rewrite them all to the enclosing string's
/// opening quote.
fn reposition(expr: &mut Expr, pos: &Position) {
    expr.pos = pos.clone();
    if let crate::ast::ExprKind::List { children, .. } = &mut expr.kind {
        for child in children {
            reposition(child, pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::find_interpolation_end;

    #[test]
    fn interpolation_end_handles_nesting() {
        assert_eq!(find_interpolation_end("x}"), Some(1));
        assert_eq!(find_interpolation_end("{a 1}}"), Some(5));
        assert_eq!(find_interpolation_end(r#"(get m "}")}"#), Some(11));
        assert_eq!(find_interpolation_end("never"), None);
    }
}
