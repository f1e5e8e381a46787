//! [`MathEngine`]: the [`ExpressionEngine`] implementation of this crate.

use crate::analysis::free_variables;
use crate::evaluator::{Evaluator, Limits};
use crate::options::EngineOptions;
use crate::value::Value;
use mathscope_parser::parse_definition;
use mathscope_types::ast::Definition;
use mathscope_types::{CompiledExpression, EvalError, ExpressionEngine, Scope, SyntaxErrors};
use std::rc::Rc;
use tracing::trace;

/// Compiles definition text into [`CompiledDefinition`]s.
///
/// ```
/// use mathscope_eval::{MathEngine, Value};
/// use mathscope_types::{CompiledExpression, ExpressionEngine, Scope};
///
/// let engine = MathEngine::new();
/// let compiled = engine.compile("a = b/2 - c").unwrap();
/// assert_eq!(compiled.free_variables(), ["b", "c"]);
///
/// let mut scope = Scope::new();
/// scope.insert("b".to_string(), Value::Number(3.0));
/// scope.insert("c".to_string(), Value::Number(-1.0));
/// assert_eq!(compiled.evaluate(&scope).unwrap(), Value::Number(2.5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MathEngine {
    options: EngineOptions,
}

impl MathEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl ExpressionEngine for MathEngine {
    type Value = Value;
    type Compiled = CompiledDefinition;

    fn compile(&self, text: &str) -> Result<CompiledDefinition, SyntaxErrors> {
        let definition = parse_definition(text, self.options.max_depth)?;
        let free_variables = free_variables(&definition);
        trace!(text, ?free_variables, "compiled definition");
        Ok(CompiledDefinition {
            definition: Rc::new(definition),
            free_variables,
            limits: Limits::from(&self.options),
        })
    }
}

/// A parsed definition together with its free variables.
#[derive(Debug, Clone)]
pub struct CompiledDefinition {
    definition: Rc<Definition>,
    free_variables: Vec<String>,
    limits: Limits,
}

impl CompiledDefinition {
    pub fn definition(&self) -> &Definition {
        &self.definition
    }
}

impl CompiledExpression for CompiledDefinition {
    type Value = Value;

    fn free_variables(&self) -> &[String] {
        &self.free_variables
    }

    fn evaluate(&self, scope: &Scope<Value>) -> Result<Value, EvalError> {
        Evaluator::new(self.limits).eval_definition(
            &self.definition,
            &self.free_variables,
            scope,
        )
    }
}
