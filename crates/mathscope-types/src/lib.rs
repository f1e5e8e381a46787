//! Shared types for mathscope.
//!
//! This crate defines the definition AST, source spans, the error taxonomy,
//! and the capability traits an expression engine implements so the scope
//! evaluator can build dependency graphs and evaluate symbols without knowing
//! anything about the engine's internals.

mod engine;
mod error;
mod span;
pub mod ast;

pub use engine::{is_builtin_name, CompiledExpression, ExpressionEngine, Scope, BUILTIN_NAMES};
pub use error::{
    ErrorCategory, ErrorCode, EvalError, SymbolError, SyntaxError, SyntaxErrors, MAX_ERRORS,
};
pub use span::{SourceText, Span};
