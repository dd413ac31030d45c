//! Integration tests for the Lexer

use dapstream_language::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn numbers_with_sign_and_exponent() {
    assert_eq!(
        kinds("-3 2.5e3 +7"),
        vec![
            TokenKind::Integer(-3),
            TokenKind::Float(2500.0),
            TokenKind::Integer(7),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn strings_keep_escaped_quotes() {
    assert_eq!(
        kinds(r#""say \"hi\"""#),
        vec![TokenKind::Str("say \"hi\"".into()), TokenKind::Eof]
    );
}

#[test]
fn identifiers_keep_escapes_until_parsed() {
    assert_eq!(
        kinds("air%20temp"),
        vec![TokenKind::Ident("air%20temp".into()), TokenKind::Eof]
    );
}

#[test]
fn spans_track_lines() {
    let tokens = Lexer::tokenize_all("a\n  &b");
    let b = &tokens[2];
    assert_eq!(b.kind, TokenKind::Ident("b".into()));
    assert_eq!((b.span.line, b.span.column), (2, 4));
}

#[test]
fn unterminated_string_is_an_error_token() {
    let tokens = kinds("\"open");
    assert!(matches!(tokens[0], TokenKind::Error(_)));
}
