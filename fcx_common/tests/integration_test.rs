//! Exercises `FcxError` and `Diagnostic` the way every downstream crate does.

use fcx_common::{Diagnostic, FcxError, Position, Severity, Span};

fn span_at(line: u32, column: u32) -> Span {
    Span::single(Position::new(line, column, 0), 0)
}

#[test]
fn fatal_error_kinds_match_the_closed_set() {
    let io = FcxError::io("file not found", span_at(1, 1));
    let preprocessor = FcxError::preprocessor("unbalanced #endif", span_at(2, 1));
    let lowering = FcxError::lowering("stack frame overflow", span_at(3, 1));
    let emitter = FcxError::emitter("backend refused module");

    assert!(io.is_fatal());
    assert!(preprocessor.is_fatal());
    assert!(lowering.is_fatal());
    assert!(emitter.is_fatal());
}

#[test]
fn lex_and_parse_errors_are_recoverable_not_fatal() {
    let lex = FcxError::lex_with_suggestions(
        "unknown operator `<~>`",
        span_at(4, 10),
        vec!["<=>".to_string(), "<<=".to_string()],
    );
    let parse = FcxError::parse("expected `)`", span_at(5, 3));

    assert!(!lex.is_fatal());
    assert!(!parse.is_fatal());
    match &lex {
        FcxError::Lex { suggestions, .. } => assert_eq!(suggestions.len(), 2),
        _ => panic!("expected Lex variant"),
    }
}

#[test]
fn diagnostic_renders_file_line_column() {
    let err = FcxError::parse("unexpected token", span_at(7, 12));
    let diag: Diagnostic = err.into();
    assert_eq!(diag.severity, Severity::Error);
    let rendered = diag.to_string();
    assert!(rendered.contains("7:12"));
}

#[test]
fn span_combine_widens_to_cover_both() {
    let a = span_at(1, 1);
    let b = Span::single(Position::new(1, 10, 9), 0);
    let combined = a.combine(b);
    assert_eq!(combined.start.column, 1);
    assert_eq!(combined.end.column, 10);
}
