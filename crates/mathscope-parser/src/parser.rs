//! Core parser infrastructure: token cursor, error reporting, helpers.

use mathscope_lexer::token::{Token, TokenKind};
use mathscope_lexer::Lexer;
use mathscope_types::ast::{Definition, Ident};
use mathscope_types::{ErrorCode, SourceText, Span, SyntaxError, SyntaxErrors};

/// Default limit on expression nesting.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Parser for a single symbol definition.
///
/// Consumes a token stream produced by the lexer and builds a
/// [`Definition`]. Parsing stops at the first error inside an expression;
/// errors found before that point are all reported.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_text: &'src SourceText,
    errors: SyntaxErrors,
    /// Current expression nesting depth.
    pub(crate) expr_depth: u32,
    pub(crate) max_depth: u32,
}

pub struct ParseResult {
    pub definition: Option<Definition>,
    pub errors: SyntaxErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_text: &'src SourceText) -> Self {
        Self {
            tokens,
            pos: 0,
            source_text,
            errors: SyntaxErrors::empty(),
            expr_depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof, so `last` only
        // misses on a hand-built empty stream.
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF_TOKEN)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or(Span::point(1, 1))
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect a closing delimiter opened at `open_span`.
    pub(crate) fn expect_closing(&mut self, expected: &TokenKind, open_span: Span) -> Option<Token> {
        if self.check_exact(expected) {
            return Some(self.advance());
        }
        let code = if self.at_end() {
            ErrorCode::UNCLOSED_DELIMITER
        } else {
            ErrorCode::UNEXPECTED_TOKEN
        };
        let span = self.current_span();
        let source_line = self.source_text.line(span.start_line).unwrap_or("");
        let error = SyntaxError::new(
            code,
            format!("expected '{}', got '{}'", expected, self.peek_kind()),
            span,
            source_line,
        )
        .with_suggestion(format!(
            "close the delimiter opened at {open_span} with '{expected}'"
        ));
        self.errors.push_error(error);
        None
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_text.line(span.start_line).unwrap_or("");
        self.errors
            .push_error(SyntaxError::new(code, message, span, source_line));
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Definition`].
    pub fn parse(mut self) -> ParseResult {
        let definition = self.parse_definition();
        let definition = if self.errors.has_errors() {
            None
        } else {
            definition
        };
        ParseResult {
            definition,
            errors: self.errors,
        }
    }
}

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    span: Span {
        start_line: 1,
        start_col: 1,
        end_line: 1,
        end_col: 1,
    },
};

/// Lex and parse one definition.
///
/// Lexer and parser errors are merged; any error makes the whole definition
/// invalid.
pub fn parse_definition(text: &str, max_depth: u32) -> Result<Definition, SyntaxErrors> {
    let source_text = SourceText::new(text);
    let lexed = Lexer::new(&source_text).lex();
    let parsed = Parser::new(lexed.tokens, &source_text)
        .with_max_depth(max_depth)
        .parse();

    let mut errors = lexed.errors;
    errors.extend(parsed.errors);
    match parsed.definition {
        Some(definition) if !errors.has_errors() => Ok(definition),
        _ => Err(errors),
    }
}
