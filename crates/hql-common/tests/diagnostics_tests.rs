use super::*;
use crate::error::{LowerError, ParseError, ParseErrorKind};
use crate::position::Position;
use std::sync::Arc;

fn pos(line: u32, column: u32) -> Position {
    Position::new(line, column, Arc::from("test.hql"))
}

#[test]
fn test_parse_error_renders_position() {
    let err = ParseError::unexpected_close(pos(2, 4), ')');
    let diag = Diagnostic::from(&err);
    assert_eq!(diag.file, "test.hql");
    assert_eq!(diag.line, 2);
    assert_eq!(diag.column, 4);
    let rendered = diag.to_string();
    assert!(
        rendered.starts_with("test.hql:2:4:"),
        "unexpected rendering: {rendered}"
    );
}

#[test]
fn test_unclosed_names_the_open_position() {
    let err = ParseError::unclosed(
        crate::error::DelimiterKind::Vector,
        pos(1, 5),
        pos(3, 0),
    );
    assert!(matches!(err.kind, ParseErrorKind::Unclosed { .. }));
    let rendered = err.to_string();
    assert!(
        rendered.contains("test.hql:1:5"),
        "should point at the opening delimiter: {rendered}"
    );
}

#[test]
fn test_lower_error_payload() {
    let err = LowerError::validation("hash-map literal", "an even number of forms", "3 forms")
        .with_pos(pos(7, 2));
    let diag = Diagnostic::from(&err);
    assert_eq!(diag.context.as_deref(), Some("hash-map literal"));
    assert_eq!(diag.expected.as_deref(), Some("an even number of forms"));
    assert_eq!(diag.found.as_deref(), Some("3 forms"));
    assert_eq!(diag.line, 7);
}

#[test]
fn test_with_pos_keeps_innermost() {
    let err = LowerError::transform("loop", "tail recur", "non-tail recur")
        .with_pos(pos(4, 1))
        .with_pos(pos(1, 0));
    assert_eq!(err.pos.as_ref().map(|p| p.line), Some(4));
}
