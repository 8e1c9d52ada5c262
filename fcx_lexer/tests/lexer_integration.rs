//! Exercises the lexer against short programs rather than single tokens.

use fcx_lexer::{Lexer, TokenKind};

fn kinds(src: &str) -> Vec<TokenKind> {
    let (tokens, _) = Lexer::new(src, 0).tokenize();
    tokens.into_iter().map(|t| t.value).collect()
}

#[test]
fn function_signature_lexes_as_expected_token_sequence() {
    let kinds = kinds("fn add(a, b) -> a + b");
    assert!(matches!(kinds[0], TokenKind::Keyword(ref s) if s == "fn"));
    assert!(matches!(kinds[1], TokenKind::Identifier(ref s) if s == "add"));
    assert!(matches!(kinds[2], TokenKind::LeftParen));
    assert!(matches!(kinds[3], TokenKind::Identifier(ref s) if s == "a"));
    assert!(matches!(&kinds[4], TokenKind::Operator(_, s) if s == ","));
}

#[test]
fn atomic_and_memory_forms_are_recognized_as_operators() {
    let kinds = kinds("! x <-> y heap64> n");
    assert!(matches!(&kinds[0], TokenKind::Operator(_, s) if s == "!"));
    assert!(matches!(&kinds[2], TokenKind::Operator(_, s) if s == "<->"));
    assert!(matches!(&kinds[4], TokenKind::Operator(_, s) if s == "heap64>"));
}

#[test]
fn shift_rotate_family_disambiguates_longest_form() {
    let kinds = kinds("a <<<= b");
    assert!(matches!(&kinds[1], TokenKind::Operator(_, s) if s == "<<<="));
}

#[test]
fn end_of_file_token_always_terminates() {
    let (tokens, _) = Lexer::new("1 + 1", 0).tokenize();
    assert!(matches!(tokens.last().unwrap().value, TokenKind::EndOfFile));
}

#[test]
fn zero_directive_source_tokenizes_without_error() {
    let (_, had_error) = Lexer::new("let x = 1;\nlet y = x + 1;\n", 0).tokenize();
    assert!(!had_error);
}
