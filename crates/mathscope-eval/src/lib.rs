//! mathscope reference expression engine.
//!
//! Compiles definition text (`a = b/2 - c`, `f(x, y) = a*x^2 - b*y`) into a
//! [`CompiledDefinition`] that reports its free variables and evaluates
//! against a scope of [`Value`]s. This is the engine the scope evaluator in
//! the `mathscope` crate is exercised with; any other engine implementing
//! [`mathscope_types::ExpressionEngine`] can take its place.

mod analysis;
mod builtins;
mod engine;
mod evaluator;
mod options;
mod value;

pub use analysis::free_variables;
pub use engine::{CompiledDefinition, MathEngine};
pub use options::EngineOptions;
pub use value::{FunctionValue, Value};
