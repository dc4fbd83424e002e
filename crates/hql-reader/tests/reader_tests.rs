use hql_common::{DelimiterKind, ParseErrorKind};
use hql_reader::{Expr, ExprKind, ListKind, Literal, read};

fn read_one(source: &str) -> Expr {
    let mut forms = read(source, "test.hql").expect("read should succeed in test");
    assert_eq!(forms.len(), 1, "expected a single top-level form");
    forms.remove(0)
}

#[test]
fn test_reads_literals() {
    assert_eq!(
        read_one("42").kind,
        ExprKind::Literal(Literal::Number(42.0))
    );
    assert_eq!(
        read_one("true").kind,
        ExprKind::Literal(Literal::Bool(true))
    );
    assert_eq!(read_one("null").kind, ExprKind::Literal(Literal::Null));
    assert_eq!(
        read_one(r#""hi""#).kind,
        ExprKind::Literal(Literal::Str("hi".to_string()))
    );
    assert_eq!(
        read_one("10n").kind,
        ExprKind::Literal(Literal::BigInt("10".to_string()))
    );
}

#[test]
fn test_reads_nested_lists_with_positions() {
    let form = read_one("(+ 1\n   (* 2 3))");
    let children = form.list_children().expect("list");
    assert_eq!(children.len(), 3);
    assert!(children[0].is_symbol("+"));
    let inner = &children[2];
    assert_eq!((inner.pos.line, inner.pos.column), (2, 3));
    let inner_children = inner.list_children().expect("inner list");
    assert!(inner_children[0].is_symbol("*"));
    assert_eq!((inner_children[0].pos.line, inner_children[0].pos.column), (2, 4));
}

#[test]
fn test_vector_literal_provenance() {
    let form = read_one("[1 2 3]");
    assert_eq!(form.list_kind(), Some(ListKind::VectorLiteral));
    let children = form.list_children().expect("list");
    assert!(children[0].is_symbol("vector"));
    assert_eq!(children.len(), 4);
}

#[test]
fn test_map_literal_provenance() {
    let form = read_one("{a 1 b 2}");
    assert_eq!(form.list_kind(), Some(ListKind::MapLiteral));
    let children = form.list_children().expect("list");
    assert!(children[0].is_symbol("hash-map"));
    assert_eq!(children.len(), 5);
}

#[test]
fn test_parens_provenance_is_distinct() {
    // `[a b]` and `(vector a b)` read to the same children but different
    // provenance; pattern detection relies on the difference.
    let surface = read_one("[a b]");
    let spelled = read_one("(vector a b)");
    assert_eq!(
        surface.list_children().expect("list").len(),
        spelled.list_children().expect("list").len()
    );
    assert_eq!(surface.list_kind(), Some(ListKind::VectorLiteral));
    assert_eq!(spelled.list_kind(), Some(ListKind::Parens));
}

#[test]
fn test_reader_macros_expand() {
    let form = read_one("'x");
    assert!(form.is_form("quote"));

    let form = read_one("`(a ~b ~@c)");
    assert!(form.is_form("quasiquote"));
    let inner = &form.list_children().expect("list")[1];
    let inner_children = inner.list_children().expect("list");
    assert!(inner_children[1].is_form("unquote"));
    assert!(inner_children[2].is_form("unquote-splicing"));
}

#[test]
fn test_template_literal_splits_pieces() {
    let form = read_one(r#""sum is ${(+ a b)}!""#);
    assert!(form.is_form("template-literal"));
    let children = form.list_children().expect("list");
    assert_eq!(children.len(), 4);
    assert_eq!(children[1].string_value(), Some("sum is "));
    assert!(children[2].is_form("+"));
    assert_eq!(children[3].string_value(), Some("!"));
    // Pieces carry the opening quote's position.
    assert_eq!(children[2].pos, form.pos);
}

#[test]
fn test_template_literal_leading_expression() {
    let form = read_one(r#""${x} items""#);
    let children = form.list_children().expect("list");
    assert!(children[1].is_symbol("x"));
    assert_eq!(children[2].string_value(), Some(" items"));
}

#[test]
fn test_plain_string_is_not_template() {
    let form = read_one(r#""no interpolation here""#);
    assert!(matches!(form.kind, ExprKind::Literal(Literal::Str(_))));
}

#[test]
fn test_unclosed_list_reports_open_position() {
    let err = read("(def x\n  (foo 1", "test.hql").expect_err("unclosed");
    match err.kind {
        ParseErrorKind::Unclosed { which, opened_at } => {
            assert_eq!(which, DelimiterKind::List);
            // The innermost unclosed delimiter wins.
            assert_eq!((opened_at.line, opened_at.column), (2, 2));
        }
        other => panic!("expected Unclosed, got {other:?}"),
    }
}

#[test]
fn test_unclosed_vector() {
    let err = read("[1 2", "test.hql").expect_err("unclosed");
    assert!(matches!(
        err.kind,
        ParseErrorKind::Unclosed {
            which: DelimiterKind::Vector,
            ..
        }
    ));
}

#[test]
fn test_stray_close_reports_its_own_position() {
    let err = read("(a b))", "test.hql").expect_err("stray close");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedClose);
    assert_eq!((err.pos.line, err.pos.column), (1, 5));
}

#[test]
fn test_mismatched_close_inside_list() {
    let err = read("(a]", "test.hql").expect_err("mismatched close");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedClose);
    assert_eq!(err.pos.column, 2);
}

#[test]
fn test_multiple_top_level_forms() {
    let forms = read("(def a 1) (def b 2)\n(def c 3)", "test.hql").expect("read");
    assert_eq!(forms.len(), 3);
    assert_eq!(forms[2].pos.line, 2);
}

#[test]
fn test_depth_limit() {
    let deep = "(".repeat(600) + &")".repeat(600);
    let err = read(&deep, "test.hql").expect_err("too deep");
    assert_eq!(err.kind, ParseErrorKind::TooDeep);
}

#[test]
fn test_round_trip_positions_point_at_token_starts() {
    let source = "(foo \"bar\" 42)";
    let form = read_one(source);
    let children = form.list_children().expect("list");
    for child in children {
        assert_eq!(child.pos.line, 1);
        let col = child.pos.column as usize;
        assert!(col < source.len(), "column {col} out of range");
    }
    assert_eq!(children[1].pos.column, 5, "string starts at its open quote");
}
