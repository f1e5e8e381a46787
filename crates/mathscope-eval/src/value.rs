//! Runtime values produced by evaluating a definition.

use crate::evaluator::{Evaluator, Limits};
use mathscope_types::ast::Definition;
use mathscope_types::{EvalError, Scope};
use serde::{Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    /// Possibly nested; `[[1, 2], [3, 4]]` is an array of arrays.
    Array(Vec<Value>),
    Function(Rc<FunctionValue>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Function(func) => write!(f, "{func}"),
        }
    }
}

/// Numbers and arrays serialize as JSON numbers and arrays; functions as
/// their signature, e.g. `"f(x, y)"`. Non-finite numbers have no JSON
/// form and serialize as the strings `"Infinity"`, `"-Infinity"` and `"NaN"`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) if n.is_nan() => serializer.serialize_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                serializer.serialize_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Array(items) => items.serialize(serializer),
            Value::Function(func) => serializer.collect_str(func),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A user-defined function: `f(x, y) = a*x^2 - b*y`.
///
/// `captured` holds the values its free variables had when the definition
/// was evaluated, so calling it never looks at the live scope.
#[derive(Debug, PartialEq)]
pub struct FunctionValue {
    pub(crate) name: String,
    pub(crate) params: Vec<String>,
    pub(crate) definition: Rc<Definition>,
    pub(crate) captured: Scope<Value>,
    pub(crate) limits: Limits,
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Call the function with a fresh step budget.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        Evaluator::new(self.limits).call_function(self, args)
    }
}

/// Functions capture the functions they call, so a chain of definitions
/// nests one `Rc` per link. Tear it down with a work list instead of
/// recursive drop glue.
impl Drop for FunctionValue {
    fn drop(&mut self) {
        let mut pending: Vec<Value> = std::mem::take(&mut self.captured).into_values().collect();
        while let Some(value) = pending.pop() {
            match value {
                Value::Function(rc) => {
                    if let Ok(mut inner) = Rc::try_unwrap(rc) {
                        pending.extend(std::mem::take(&mut inner.captured).into_values());
                    }
                }
                Value::Array(items) => pending.extend(items),
                Value::Number(_) => {}
            }
        }
    }
}

impl fmt::Display for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(", "))
    }
}
