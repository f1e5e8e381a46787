//! AST for a single symbol definition.
//!
//! A definition is either a constant assignment (`a = b/2 - c`), a function
//! assignment (`f(x, y) = a*x^2 - b*y`), or a bare expression. Every node
//! carries a [`Span`] for error reporting.

use crate::Span;
use std::fmt;

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Definitions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    /// `name = body`
    Constant { name: Ident, body: Expr },
    /// `name(params) = body`
    Function {
        name: Ident,
        params: Vec<Ident>,
        body: Expr,
    },
    /// A definition without a left-hand side.
    Expression(Expr),
}

impl Definition {
    pub fn new(kind: DefinitionKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The assigned name, if the definition has a left-hand side.
    pub fn name(&self) -> Option<&Ident> {
        match &self.kind {
            DefinitionKind::Constant { name, .. } | DefinitionKind::Function { name, .. } => {
                Some(name)
            }
            DefinitionKind::Expression(_) => None,
        }
    }

    pub fn body(&self) -> &Expr {
        match &self.kind {
            DefinitionKind::Constant { body, .. }
            | DefinitionKind::Function { body, .. }
            | DefinitionKind::Expression(body) => body,
        }
    }

    /// Bound parameters; empty unless this is a function definition.
    pub fn params(&self) -> &[Ident] {
        match &self.kind {
            DefinitionKind::Function { params, .. } => params,
            _ => &[],
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DefinitionKind::Function { .. })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Identifier(String),
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `f(args)`
    Call { callee: Ident, args: Vec<Expr> },
    /// `v[i]` (1-based)
    Index { object: Box<Expr>, index: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        })
    }
}
