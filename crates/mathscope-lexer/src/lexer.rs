//! Definition lexer: converts definition text to a token stream.
//!
//! Whitespace, including newlines, only separates tokens. Errors are
//! collected (up to [`MAX_ERRORS`]) and the offending character is skipped,
//! so one stray character does not hide the rest of the definition's
//! problems.

use mathscope_types::{ErrorCode, SourceText, Span, SyntaxError, SyntaxErrors, MAX_ERRORS};

use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src [u8],
    source_text: &'src SourceText,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: SyntaxErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: SyntaxErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_text: &'src SourceText) -> Self {
        Self {
            source: source_text.as_str().as_bytes(),
            source_text,
            pos: 0,
            line: 1,
            col: 1,
            errors: SyntaxErrors::empty(),
        }
    }

    /// Lex the entire definition into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if !is_utf8_continuation(ch) {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_text.line(span.start_line).unwrap_or("");
        self.errors
            .push_error(SyntaxError::new(code, message, span, source_line));
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek() {
            self.advance();
        }
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let start = self.pos;
            let start_line = self.line;
            let start_col = self.col;
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'0'..=b'9' => self.scan_number(start),
                b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => self.scan_number(start),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start),
                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'%' => TokenKind::Percent,
                b'^' => TokenKind::Caret,
                b'=' => TokenKind::Eq,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b',' => TokenKind::Comma,
                _ => {
                    // Swallow the rest of a multi-byte character so it is
                    // reported once.
                    while self.peek().is_some_and(is_utf8_continuation) {
                        self.advance();
                    }
                    let span = self.span_from(start_line, start_col);
                    let text = self.text_from(start);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("unexpected character '{text}'"),
                        span,
                    );
                    if self.errors.total_errors >= MAX_ERRORS {
                        return Token::new(TokenKind::Eof, self.current_span());
                    }
                    continue;
                }
            };

            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    /// Scan the rest of a number whose first character is already consumed.
    fn scan_number(&mut self, start: usize) -> TokenKind {
        let start_line = self.line;
        let start_col = self.col - 1;

        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        let leading_dot = self.source[start] == b'.';
        if !leading_dot && self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9'))
        {
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        // Exponent only when digits follow; `2e` stays number + identifier.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digits_at = if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                2
            } else {
                1
            };
            if matches!(self.peek_at(digits_at), Some(b'0'..=b'9')) {
                for _ in 0..digits_at {
                    self.advance();
                }
                while let Some(b'0'..=b'9') = self.peek() {
                    self.advance();
                }
            }
        }

        let text = self.text_from(start);
        match text.parse::<f64>() {
            Ok(value) => TokenKind::NumberLit(value),
            Err(_) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("invalid number literal '{text}'"),
                    span,
                );
                TokenKind::NumberLit(0.0)
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Identifier(self.text_from(start).to_string())
    }
}

fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_track_columns() {
        let src = SourceText::new("ab = 12");
        let tokens = Lexer::new(&src).lex().tokens;
        assert_eq!(tokens[0].span, Span::new(1, 1, 1, 2));
        assert_eq!(tokens[1].span, Span::new(1, 4, 1, 4));
        assert_eq!(tokens[2].span, Span::new(1, 6, 1, 7));
    }

    #[test]
    fn test_spans_across_newline() {
        let src = SourceText::new("f(x) =\n  x");
        let tokens = Lexer::new(&src).lex().tokens;
        let x = &tokens[5];
        assert_eq!(x.kind, TokenKind::Identifier("x".into()));
        assert_eq!(x.span, Span::new(2, 3, 2, 3));
    }
}
