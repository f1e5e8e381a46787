//! Definition parsing: the optional assignment head in front of an
//! expression.
//!
//! ```text
//! Definition = Ident "=" Expr
//!            | Ident "(" [ Ident { "," Ident } ] ")" "=" Expr
//!            | Expr
//! ```

use mathscope_lexer::token::TokenKind;
use mathscope_types::ast::*;
use mathscope_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn parse_definition(&mut self) -> Option<Definition> {
        if self.at_end() {
            self.error_at_current(ErrorCode::EMPTY_DEFINITION, "definition is empty");
            return None;
        }

        let start = self.current_span();
        let kind = if self.at_constant_head() {
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Eq)?;
            let body = self.parse_expression()?;
            DefinitionKind::Constant { name, body }
        } else if self.at_function_head() {
            let name = self.expect_identifier()?;
            let params = self.parse_params()?;
            self.expect(&TokenKind::Eq)?;
            let body = self.parse_expression()?;
            DefinitionKind::Function { name, params, body }
        } else {
            let body = self.parse_expression()?;
            if self.check_exact(&TokenKind::Eq) {
                self.error_at(
                    ErrorCode::INVALID_ASSIGNMENT_TARGET,
                    "left-hand side of '=' must be a name or a function head like f(x, y)",
                    body.span,
                );
                return None;
            }
            DefinitionKind::Expression(body)
        };

        if !self.at_end() {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("unexpected '{}' after end of definition", self.peek_kind()),
            );
            return None;
        }

        let span = start.merge(self.previous_span());
        Some(Definition::new(kind, span))
    }

    /// `name =`
    fn at_constant_head(&self) -> bool {
        matches!(self.look_ahead(0), TokenKind::Identifier(_))
            && matches!(self.look_ahead(1), TokenKind::Eq)
    }

    /// `name ( [ident {, ident}] ) =`: distinguishes a function head from a
    /// call expression such as `f(2) + 1`.
    fn at_function_head(&self) -> bool {
        if !matches!(self.look_ahead(0), TokenKind::Identifier(_))
            || !matches!(self.look_ahead(1), TokenKind::LParen)
        {
            return false;
        }
        let mut n = 2;
        if matches!(self.look_ahead(n), TokenKind::RParen) {
            return matches!(self.look_ahead(n + 1), TokenKind::Eq);
        }
        loop {
            if !matches!(self.look_ahead(n), TokenKind::Identifier(_)) {
                return false;
            }
            match self.look_ahead(n + 1) {
                TokenKind::Comma => n += 2,
                TokenKind::RParen => return matches!(self.look_ahead(n + 2), TokenKind::Eq),
                _ => return false,
            }
        }
    }

    fn parse_params(&mut self) -> Option<Vec<Ident>> {
        self.expect(&TokenKind::LParen)?;
        let mut params: Vec<Ident> = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(params);
        }
        loop {
            let param = self.expect_identifier()?;
            if params.iter().any(|p| p.name == param.name) {
                self.error_at(
                    ErrorCode::DUPLICATE_PARAMETER,
                    format!("parameter '{}' is declared more than once", param.name),
                    param.span,
                );
                return None;
            }
            params.push(param);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }
}
