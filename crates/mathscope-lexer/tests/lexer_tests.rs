//! Lexer tests: operators, number forms, identifiers, whitespace handling,
//! error recovery, and determinism.

use mathscope_lexer::{Lexer, TokenKind};
use mathscope_types::{ErrorCode, SourceText};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let src = SourceText::new(source);
    Lexer::new(&src)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_count(source: &str) -> usize {
    let src = SourceText::new(source);
    Lexer::new(&src).lex().errors.total_errors
}

fn first_error(source: &str) -> String {
    let src = SourceText::new(source);
    Lexer::new(&src)
        .lex()
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_single_character_tokens() {
    assert_eq!(
        kinds("+ - * / % ^ = ( ) [ ] ,"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Caret,
            TokenKind::Eq,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
        ]
    );
}

#[test]
fn test_constant_definition() {
    assert_eq!(
        kinds("a = b/2 - c"),
        vec![
            ident("a"),
            TokenKind::Eq,
            ident("b"),
            TokenKind::Slash,
            TokenKind::NumberLit(2.0),
            TokenKind::Minus,
            ident("c"),
        ]
    );
}

#[test]
fn test_function_definition() {
    assert_eq!(
        kinds("f(x,y)=a*x^2-b*y"),
        vec![
            ident("f"),
            TokenKind::LParen,
            ident("x"),
            TokenKind::Comma,
            ident("y"),
            TokenKind::RParen,
            TokenKind::Eq,
            ident("a"),
            TokenKind::Star,
            ident("x"),
            TokenKind::Caret,
            TokenKind::NumberLit(2.0),
            TokenKind::Minus,
            ident("b"),
            TokenKind::Star,
            ident("y"),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_number_forms() {
    assert_eq!(kinds("42"), vec![TokenKind::NumberLit(42.0)]);
    assert_eq!(kinds("2.5"), vec![TokenKind::NumberLit(2.5)]);
    assert_eq!(kinds(".5"), vec![TokenKind::NumberLit(0.5)]);
    assert_eq!(kinds("1e3"), vec![TokenKind::NumberLit(1000.0)]);
    assert_eq!(kinds("2.5E-1"), vec![TokenKind::NumberLit(0.25)]);
    assert_eq!(kinds("1e+2"), vec![TokenKind::NumberLit(100.0)]);
}

#[test]
fn test_exponent_without_digits_is_identifier() {
    assert_eq!(kinds("2e"), vec![TokenKind::NumberLit(2.0), ident("e")]);
    assert_eq!(
        kinds("2e+x"),
        vec![
            TokenKind::NumberLit(2.0),
            ident("e"),
            TokenKind::Plus,
            ident("x"),
        ]
    );
}

#[test]
fn test_trailing_dot_not_consumed() {
    let k = kinds("3.");
    assert_eq!(k[0], TokenKind::NumberLit(3.0));
    assert_eq!(error_count("3."), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Identifiers & whitespace
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("x_1 _t Alpha pi"),
        vec![ident("x_1"), ident("_t"), ident("Alpha"), ident("pi")]
    );
}

#[test]
fn test_newlines_are_whitespace() {
    assert_eq!(
        kinds("a =\n\t1\r\n+ 2"),
        vec![
            ident("a"),
            TokenKind::Eq,
            TokenKind::NumberLit(1.0),
            TokenKind::Plus,
            TokenKind::NumberLit(2.0),
        ]
    );
}

#[test]
fn test_empty_input_is_just_eof() {
    let src = SourceText::new("   ");
    let result = Lexer::new(&src).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(!result.errors.has_errors());
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_recovers() {
    assert_eq!(kinds("a = 1 $ 2"), vec![
        ident("a"),
        TokenKind::Eq,
        TokenKind::NumberLit(1.0),
        TokenKind::NumberLit(2.0),
    ]);
    assert_eq!(error_count("a = 1 $ 2"), 1);
    assert_eq!(first_error("a = 1 $ 2"), "unexpected character '$'");
}

#[test]
fn test_multibyte_character_reported_once() {
    assert_eq!(error_count("a = π"), 1);
    assert_eq!(first_error("a = π"), "unexpected character 'π'");
}

#[test]
fn test_error_code_and_source_line() {
    let src = SourceText::new("a = 1\nb = #");
    let result = Lexer::new(&src).lex();
    let err = result.errors.first().unwrap();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.span.start_line, 2);
    assert_eq!(err.span.start_col, 5);
    assert_eq!(err.source_line, "b = #");
}

#[test]
fn test_error_limit_stops_lexing() {
    let source = "#".repeat(50);
    let src = SourceText::new(source.as_str());
    let result = Lexer::new(&src).lex();
    assert_eq!(result.errors.total_errors, mathscope_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().unwrap().kind, TokenKind::Eof);
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_lexer_determinism_100_iterations() {
    let source = "f(x, y) = a*x^2 - b*y + [1, 2.5, .5e1][2]";
    let first = kinds(source);
    for i in 0..100 {
        assert_eq!(first, kinds(source), "Determinism failure at iteration {i}");
    }
}
