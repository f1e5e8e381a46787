//! Reactive evaluation of named mathematical definitions.
//!
//! Given a [`SymbolSet`] such as `{c: "c = -1", b: "b = c + 4", a: "a = b/2 - c"}`
//! the [`ScopeEvaluator`] builds the dependency graph, sets aside symbols
//! that reference undefined names, orders the rest so dependencies come
//! first, and evaluates each one with an [`ExpressionEngine`]. When only a
//! few definitions change, passing the previous [`ScopeState`] back in
//! re-evaluates just those symbols and their dependents.
//!
//! Pipeline, leaves first:
//!
//! 1. [`build_child_map`]: dependency to dependents, plus unmet dependencies
//! 2. [`remove_unmet`]: drop symbols with unmet dependencies, with errors
//! 3. [`evaluation_order`]: topological order, cycles reported per symbol
//! 4. [`ScopeEvaluator::evaluate`]: full or incremental pass

mod evaluator;
mod filter;
mod graph;
mod order;

pub use evaluator::{diff_symbols, EvalResult, ScopeEvaluator, ScopeState, SymbolDiff, SymbolSet};
pub use filter::{remove_unmet, Filtered};
pub use graph::{build_child_map, descendants, ChildMap, DependencyGraph, UnmetDependencies};
pub use order::{evaluation_order, EvaluationOrder};

pub use mathscope_types::{
    is_builtin_name, CompiledExpression, EvalError, ExpressionEngine, Scope, SymbolError,
    SyntaxErrors, BUILTIN_NAMES,
};
