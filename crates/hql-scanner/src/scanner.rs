//! The scanner proper.

use std::sync::Arc;

use hql_common::{ParseError, ParseErrorKind, Position, Span};
use memchr::memchr;

use crate::token::{Token, TokenKind};

/// Characters that terminate a symbol or number token.
fn is_terminator(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\'' | '`' | '~'
    ) || is_whitespace(c)
}

/// Commas count as whitespace, so `{a 1, b 2}` scans like `{a 1 b 2}`.
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Streaming tokenizer over a single source string.
///
/// The scanner tracks line and column incrementally; columns count
/// characters, not bytes.
pub struct Scanner<'a> {
    source: &'a str,
    file: Arc<str>,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(source: &'a str, file: impl Into<Arc<str>>) -> Self {
        Self {
            source,
            file: file.into(),
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    /// Scan the entire source into a token vector.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Current position, for error reporting at EOF.
    #[must_use]
    pub fn pos(&self) -> Position {
        Position::new(self.line, self.column, Arc::clone(&self.file))
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if is_whitespace(c) => {
                    self.bump();
                }
                Some(';') => {
                    // Comment to end of line
                    match memchr(b'\n', self.source[self.offset..].as_bytes()) {
                        Some(rel) => {
                            // Count the skipped characters for the column,
                            // then let bump() consume the newline itself.
                            let skipped = &self.source[self.offset..self.offset + rel];
                            self.column += u32::try_from(skipped.chars().count()).unwrap_or(0);
                            self.offset += rel;
                            self.bump();
                        }
                        None => {
                            self.offset = self.source.len();
                            return;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia();
        let start_offset = self.offset;
        let start_pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '(' => {
                self.bump();
                TokenKind::LParen
            }
            ')' => {
                self.bump();
                TokenKind::RParen
            }
            '[' => {
                self.bump();
                TokenKind::LBracket
            }
            ']' => {
                self.bump();
                TokenKind::RBracket
            }
            '{' => {
                self.bump();
                TokenKind::LBrace
            }
            '}' => {
                self.bump();
                TokenKind::RBrace
            }
            '\'' => {
                self.bump();
                TokenKind::Quote
            }
            '`' => {
                self.bump();
                TokenKind::Quasiquote
            }
            '~' => {
                self.bump();
                if self.peek() == Some('@') {
                    self.bump();
                    TokenKind::UnquoteSplicing
                } else {
                    TokenKind::Unquote
                }
            }
            '"' => self.scan_string(&start_pos)?,
            c if starts_number(c, self.peek_second()) => self.scan_number(&start_pos)?,
            _ => self.scan_symbol(),
        };

        let span = Span::new(
            u32::try_from(start_offset).unwrap_or(u32::MAX),
            u32::try_from(self.offset).unwrap_or(u32::MAX),
        );
        Ok(Some(Token::new(kind, span, start_pos)))
    }

    fn scan_string(&mut self, open_pos: &Position) -> Result<TokenKind, ParseError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            let escape_pos = self.pos();
            match self.bump() {
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::BadString,
                        open_pos.clone(),
                        "unterminated string literal",
                    ));
                }
                Some('"') => return Ok(TokenKind::Str(value)),
                Some('\\') => match self.bump() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some(other) => {
                        return Err(ParseError::new(
                            ParseErrorKind::BadEscape,
                            escape_pos,
                            format!("unknown escape sequence `\\{other}` in string literal"),
                        ));
                    }
                    None => {
                        return Err(ParseError::new(
                            ParseErrorKind::BadString,
                            open_pos.clone(),
                            "unterminated string literal",
                        ));
                    }
                },
                Some(other) => value.push(other),
            }
        }
    }

    fn scan_number(&mut self, start_pos: &Position) -> Result<TokenKind, ParseError> {
        let start = self.offset;
        while let Some(c) = self.peek() {
            if is_terminator(c) {
                break;
            }
            self.bump();
        }
        let text = &self.source[start..self.offset];

        if let Some(digits) = text.strip_suffix('n') {
            let unsigned = digits.strip_prefix(['+', '-']).unwrap_or(digits);
            if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(TokenKind::Num {
                    value: 0.0,
                    raw: digits.to_string(),
                    bigint: true,
                });
            }
            return Err(ParseError::new(
                ParseErrorKind::BadNumber,
                start_pos.clone(),
                format!("malformed bigint literal `{text}`"),
            ));
        }

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(TokenKind::Num {
                value,
                raw: text.to_string(),
                bigint: false,
            }),
            _ => Err(ParseError::new(
                ParseErrorKind::BadNumber,
                start_pos.clone(),
                format!("malformed number literal `{text}`"),
            )),
        }
    }

    fn scan_symbol(&mut self) -> TokenKind {
        let start = self.offset;
        while let Some(c) = self.peek() {
            if is_terminator(c) {
                break;
            }
            self.bump();
        }
        TokenKind::Sym(self.source[start..self.offset].to_string())
    }
}

/// A token starts a number when it begins with a digit, or with `+`/`-`/`.`
/// immediately followed by a digit (so `-`, `...`, and `.method` stay
/// symbols).
fn starts_number(first: char, second: Option<char>) -> bool {
    if first.is_ascii_digit() {
        return true;
    }
    matches!(first, '+' | '-' | '.') && second.is_some_and(|c| c.is_ascii_digit())
}
