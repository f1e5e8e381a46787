//! mathscope parser: converts a token stream into a [`Definition`] AST.
//!
//! [`Definition`]: mathscope_types::ast::Definition

mod parse_def;
mod parse_expr;
mod parser;

pub use parser::{parse_definition, ParseResult, Parser, DEFAULT_MAX_DEPTH};
