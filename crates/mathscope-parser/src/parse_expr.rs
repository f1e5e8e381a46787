//! Expression parsing with operator precedence.
//!
//! Precedence (lowest → highest):
//! 4. `+`, `-`
//! 3. `*`, `/`, `%`
//! 2. unary `-`, `+`
//! 1. `^` (right associative, binds tighter than unary minus on its left:
//!    `-2^2` is `-(2^2)`)
//! 0. call `f(...)`, index `v[i]`

use mathscope_lexer::token::TokenKind;
use mathscope_types::ast::*;
use mathscope_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.nested(Self::parse_additive)
    }

    /// `Expr = Term { ("+" | "-") Term }`
    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Term = Unary { ("*" | "/" | "%") Unary }`
    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `Unary = ("-" | "+") Unary | Power`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_power(),
        };
        let start = self.advance().span;
        let operand = self.nested(Self::parse_unary)?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `Power = Postfix [ "^" Unary ]`
    fn parse_power(&mut self) -> Option<Expr> {
        let base = self.parse_postfix()?;
        if !self.eat(&TokenKind::Caret) {
            return Some(base);
        }
        let exponent = self.nested(Self::parse_unary)?;
        Some(binary(base, BinOp::Pow, exponent))
    }

    /// `Postfix = Primary { "(" args ")" | "[" Expr "]" }`
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    let ExprKind::Identifier(name) = &expr.kind else {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "only named functions can be called",
                        );
                        return None;
                    };
                    let callee = Ident::new(name.clone(), expr.span);
                    let open = self.advance().span;
                    let args = self.parse_list(&TokenKind::RParen, open)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(ExprKind::Call { callee, args }, span);
                }
                TokenKind::LBracket => {
                    let open = self.advance().span;
                    let index = self.parse_expression()?;
                    self.expect_closing(&TokenKind::RBracket, open)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => return Some(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::NumberLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::Number(n), span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Some(Expr::new(ExprKind::Identifier(name), span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_closing(&TokenKind::RParen, span)?;
                let span = span.merge(self.previous_span());
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_list(&TokenKind::RBracket, span)?;
                let span = span.merge(self.previous_span());
                Some(Expr::new(ExprKind::Array(elements), span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                None
            }
        }
    }

    /// Comma-separated expressions up to and including `close`. The opening
    /// delimiter has already been consumed.
    fn parse_list(&mut self, close: &TokenKind, open: Span) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Some(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(close, open)?;
        Some(items)
    }

    /// Run `parse` one nesting level deeper, so runs of unary operators and
    /// exponent chains count against the depth limit too.
    fn nested(&mut self, parse: fn(&mut Self) -> Option<Expr>) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > self.max_depth {
            self.error_at_current(
                ErrorCode::STRUCTURAL_LIMIT_EXCEEDED,
                format!("maximum expression nesting depth is {}", self.max_depth),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = parse(self);
        self.expr_depth -= 1;
        result
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
