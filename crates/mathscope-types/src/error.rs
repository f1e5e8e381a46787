use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of syntax errors kept for a single definition.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Structure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// Numeric code attached to every [`SyntaxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const INVALID_NUMBER: Self = Self(102);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(103);
    pub const DUPLICATE_PARAMETER: Self = Self(104);
    pub const EMPTY_DEFINITION: Self = Self(105);

    // ── Structure errors (E600–E699) ──
    pub const STRUCTURAL_LIMIT_EXCEEDED: Self = Self(600);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            600..=699 => ErrorCategory::Structure,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured error produced while lexing or parsing a definition.
///
/// The view layer renders these fields directly; it must not parse the
/// free-form message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The source line the error points into.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SyntaxError {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.span, self.code, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// All syntax errors collected for one definition.
///
/// Only the first [`MAX_ERRORS`] are stored; `total_errors` keeps counting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxError>,
    pub total_errors: usize,
}

impl SyntaxErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn push_error(&mut self, error: SyntaxError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append every error from `other`, respecting the storage limit.
    pub fn extend(&mut self, other: SyntaxErrors) {
        let uncounted = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += uncounted;
    }

    pub fn first(&self) -> Option<&SyntaxError> {
        self.errors.first()
    }
}

impl From<SyntaxError> for SyntaxErrors {
    fn from(error: SyntaxError) -> Self {
        let mut errors = Self::empty();
        errors.push_error(error);
        errors
    }
}

impl fmt::Display for SyntaxErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            None => write!(f, "no errors"),
            Some(first) if self.total_errors == 1 => write!(f, "{first}"),
            Some(first) => write!(f, "{first} (and {} more)", self.total_errors - 1),
        }
    }
}

impl std::error::Error for SyntaxErrors {}

/// Runtime failure while evaluating a compiled definition against a scope.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EvalError {
    #[error("undefined symbol: {0}")]
    UndefinedVariable(String),
    #[error("'{0}' is not a function")]
    NotCallable(String),
    #[error("{name} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),
    #[error("evaluation step limit exceeded")]
    GasExhausted,
    #[error("evaluation nested deeper than {max_depth} levels")]
    DepthExceeded { max_depth: u32 },
}

/// Why a symbol is absent from the evaluated scope.
///
/// Every symbol-level failure is captured as one of these and attached to
/// the symbol; none of them abort a pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SymbolError {
    #[error("syntax error: {0}")]
    Syntax(SyntaxErrors),
    /// The symbol, or one of its ancestors, references `missing`, which is
    /// neither a defined symbol nor a built-in.
    #[error("Eval Error: Depends on undefined symbol {missing}")]
    UnmetDependency { missing: String },
    #[error("evaluation error: {0}")]
    Evaluation(EvalError),
    /// The symbol sits on, or downstream of, the dependency loop `cycle`.
    #[error("circular reference: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

impl From<SyntaxErrors> for SymbolError {
    fn from(errors: SyntaxErrors) -> Self {
        Self::Syntax(errors)
    }
}

impl From<EvalError> for SymbolError {
    fn from(error: EvalError) -> Self {
        Self::Evaluation(error)
    }
}
