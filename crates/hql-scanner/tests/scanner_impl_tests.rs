use hql_common::ParseErrorKind;
use hql_scanner::{Scanner, Token, TokenKind};

fn scan(source: &str) -> Vec<Token> {
    Scanner::new(source, "test.hql")
        .tokenize()
        .expect("scan should succeed in test")
}

fn kinds(source: &str) -> Vec<TokenKind> {
    scan(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_delimiters_and_symbols() {
    let tokens = kinds("(foo [1 2] {a 3})");
    assert_eq!(tokens[0], TokenKind::LParen);
    assert_eq!(tokens[1], TokenKind::Sym("foo".to_string()));
    assert_eq!(tokens[2], TokenKind::LBracket);
    assert!(matches!(tokens[3], TokenKind::Num { value, .. } if value == 1.0));
    assert_eq!(tokens[5], TokenKind::RBracket);
    assert_eq!(tokens[6], TokenKind::LBrace);
    assert_eq!(*tokens.last().expect("nonempty"), TokenKind::RParen);
}

#[test]
fn test_reader_macro_tokens() {
    assert_eq!(
        kinds("'x `y ~z ~@w"),
        vec![
            TokenKind::Quote,
            TokenKind::Sym("x".to_string()),
            TokenKind::Quasiquote,
            TokenKind::Sym("y".to_string()),
            TokenKind::Unquote,
            TokenKind::Sym("z".to_string()),
            TokenKind::UnquoteSplicing,
            TokenKind::Sym("w".to_string()),
        ]
    );
}

#[test]
fn test_string_escapes() {
    let tokens = kinds(r#""a\n\t\"b\\""#);
    assert_eq!(tokens, vec![TokenKind::Str("a\n\t\"b\\".to_string())]);
}

#[test]
fn test_bad_escape_reports_position() {
    let err = Scanner::new(r#""ab\q""#, "test.hql")
        .tokenize()
        .expect_err("\\q is not a valid escape");
    assert_eq!(err.kind, ParseErrorKind::BadEscape);
    assert_eq!(err.pos.line, 1);
    assert_eq!(err.pos.column, 3);
}

#[test]
fn test_unterminated_string_points_at_open_quote() {
    let err = Scanner::new("(x \"abc", "test.hql")
        .tokenize()
        .expect_err("string never closes");
    assert_eq!(err.kind, ParseErrorKind::BadString);
    assert_eq!(err.pos.column, 3);
}

#[test]
fn test_numbers() {
    let tokens = kinds("1 -2.5 +3 0.25 1e3");
    let values: Vec<f64> = tokens
        .iter()
        .map(|t| match t {
            TokenKind::Num { value, .. } => *value,
            other => panic!("expected number, got {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![1.0, -2.5, 3.0, 0.25, 1000.0]);
}

#[test]
fn test_bigint_suffix() {
    let tokens = kinds("42n");
    assert_eq!(
        tokens,
        vec![TokenKind::Num {
            value: 0.0,
            raw: "42".to_string(),
            bigint: true,
        }]
    );
}

#[test]
fn test_bad_number() {
    let err = Scanner::new("1.2.3", "test.hql")
        .tokenize()
        .expect_err("1.2.3 is not a number");
    assert_eq!(err.kind, ParseErrorKind::BadNumber);
}

#[test]
fn test_operator_symbols_stay_symbols() {
    assert_eq!(
        kinds("+ - * / === <= >>>"),
        vec![
            TokenKind::Sym("+".to_string()),
            TokenKind::Sym("-".to_string()),
            TokenKind::Sym("*".to_string()),
            TokenKind::Sym("/".to_string()),
            TokenKind::Sym("===".to_string()),
            TokenKind::Sym("<=".to_string()),
            TokenKind::Sym(">>>".to_string()),
        ]
    );
}

#[test]
fn test_dotted_and_prefixed_symbols() {
    assert_eq!(
        kinds(".push js/console.log obj.field a?.b ...rest #priv x:Int"),
        vec![
            TokenKind::Sym(".push".to_string()),
            TokenKind::Sym("js/console.log".to_string()),
            TokenKind::Sym("obj.field".to_string()),
            TokenKind::Sym("a?.b".to_string()),
            TokenKind::Sym("...rest".to_string()),
            TokenKind::Sym("#priv".to_string()),
            TokenKind::Sym("x:Int".to_string()),
        ]
    );
}

#[test]
fn test_comments_and_commas_are_trivia() {
    let tokens = kinds("; header\n(a, b) ; trailing\n");
    assert_eq!(
        tokens,
        vec![
            TokenKind::LParen,
            TokenKind::Sym("a".to_string()),
            TokenKind::Sym("b".to_string()),
            TokenKind::RParen,
        ]
    );
}

#[test]
fn test_positions_track_lines_and_columns() {
    let tokens = scan("(a\n  bc)");
    assert_eq!((tokens[0].pos.line, tokens[0].pos.column), (1, 0));
    assert_eq!((tokens[1].pos.line, tokens[1].pos.column), (1, 1));
    assert_eq!((tokens[2].pos.line, tokens[2].pos.column), (2, 2));
    assert_eq!((tokens[3].pos.line, tokens[3].pos.column), (2, 4));
}

#[test]
fn test_spans_are_byte_offsets() {
    let source = "(abc 12)";
    let tokens = scan(source);
    assert_eq!(tokens[1].span.slice(source), "abc");
    assert_eq!(tokens[2].span.slice(source), "12");
}
