//! The capability contract between the scope evaluator and an expression
//! engine.
//!
//! The scope evaluator only needs two things from a compiled definition: the
//! names it references, and a way to evaluate it against a scope. Anything
//! else about the engine's representation stays private to the engine.

use crate::{EvalError, SyntaxErrors};
use std::collections::BTreeMap;

/// Names that never need a definition: the host math library supplies them.
pub const BUILTIN_NAMES: &[&str] = &[
    "e", "pi", "cos", "sin", "tan", "sec", "csc", "cot", "log", "ln", "exp",
];

pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Evaluated symbols, keyed by symbol name.
pub type Scope<V> = BTreeMap<String, V>;

/// A definition that has been parsed and analysed by an engine.
pub trait CompiledExpression {
    type Value: Clone;

    /// Names the definition references that are not bound by it, without
    /// duplicates, in order of first appearance. Function parameters are
    /// excluded; built-in names are included.
    fn free_variables(&self) -> &[String];

    fn evaluate(&self, scope: &Scope<Self::Value>) -> Result<Self::Value, EvalError>;
}

pub trait ExpressionEngine {
    type Value: Clone;
    type Compiled: CompiledExpression<Value = Self::Value>;

    fn compile(&self, text: &str) -> Result<Self::Compiled, SyntaxErrors>;

    /// Whether `name` resolves without a definition.
    fn is_builtin(&self, name: &str) -> bool {
        is_builtin_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        for name in ["e", "pi", "sin", "cos", "tan", "sec", "csc", "cot", "log", "ln", "exp"] {
            assert!(is_builtin_name(name), "{name} should be built in");
        }
        for name in ["x", "sqrt", "s", "PI", "E"] {
            assert!(!is_builtin_name(name), "{name} should not be built in");
        }
    }
}
