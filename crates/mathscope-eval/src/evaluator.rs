//! Tree-walking evaluator for definition bodies.

use crate::builtins;
use crate::options::EngineOptions;
use crate::value::{FunctionValue, Value};
use mathscope_types::ast::*;
use mathscope_types::{EvalError, Scope};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::trace;

type EvalResult<T> = Result<T, EvalError>;

/// Where names are looked up: call arguments first, then the scope.
struct Env<'a> {
    scope: &'a Scope<Value>,
    locals: BTreeMap<&'a str, Value>,
}

impl<'a> Env<'a> {
    fn global(scope: &'a Scope<Value>) -> Self {
        Self {
            scope,
            locals: BTreeMap::new(),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.locals.get(name).or_else(|| self.scope.get(name))
    }
}

/// Resource limits carried by compiled definitions and function values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Limits {
    pub(crate) gas: u64,
    pub(crate) depth: u32,
}

impl From<&EngineOptions> for Limits {
    fn from(options: &EngineOptions) -> Self {
        Self {
            gas: options.gas_limit,
            depth: options.max_eval_depth,
        }
    }
}

/// Walks expression trees and produces [`Value`]s.
pub(crate) struct Evaluator {
    /// Nodes visited so far.
    gas: u64,
    /// Expression frames currently on the stack, across function calls.
    depth: u32,
    limits: Limits,
}

impl Evaluator {
    pub(crate) fn new(limits: Limits) -> Self {
        Self {
            gas: 0,
            depth: 0,
            limits,
        }
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.limits.gas {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Definitions
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a whole definition against `scope`.
    ///
    /// A function definition evaluates to a [`FunctionValue`] that snapshots
    /// the current values of its free variables.
    pub(crate) fn eval_definition(
        &mut self,
        definition: &Rc<Definition>,
        free_variables: &[String],
        scope: &Scope<Value>,
    ) -> EvalResult<Value> {
        match &definition.kind {
            DefinitionKind::Constant { body, .. } | DefinitionKind::Expression(body) => {
                self.eval_expr(body, &Env::global(scope))
            }
            DefinitionKind::Function { name, params, .. } => {
                let mut captured = Scope::new();
                for var in free_variables {
                    match scope.get(var) {
                        Some(value) => {
                            captured.insert(var.clone(), value.clone());
                        }
                        None if mathscope_types::is_builtin_name(var) => {}
                        None => return Err(EvalError::UndefinedVariable(var.clone())),
                    }
                }
                Ok(Value::Function(Rc::new(FunctionValue {
                    name: name.name.clone(),
                    params: params.iter().map(|p| p.name.clone()).collect(),
                    definition: definition.clone(),
                    captured,
                    limits: self.limits,
                })))
            }
        }
    }

    pub(crate) fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        if args.len() != function.arity() {
            return Err(EvalError::ArityMismatch {
                name: function.name.clone(),
                expected: function.arity().to_string(),
                found: args.len(),
            });
        }
        trace!(function = %function.name, depth = self.depth, "call");
        let env = Env {
            scope: &function.captured,
            locals: function
                .params
                .iter()
                .map(String::as_str)
                .zip(args)
                .collect(),
        };
        self.eval_expr(function.definition.body(), &env)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, expr: &Expr, env: &Env<'_>) -> EvalResult<Value> {
        self.tick()?;
        if self.depth >= self.limits.depth {
            return Err(EvalError::DepthExceeded {
                max_depth: self.limits.depth,
            });
        }

        self.depth += 1;
        let result = self.eval_node(expr, env);
        self.depth -= 1;

        result
    }

    fn eval_node(&mut self, expr: &Expr, env: &Env<'_>) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Identifier(name) => self.eval_identifier(name, env),
            ExprKind::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env)?);
                }
                Ok(Value::Array(values))
            }
            ExprKind::Call { callee, args } => self.eval_call(&callee.name, args, env),
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                eval_index(object, &index)
            }
            ExprKind::Binary { left, op, right } => {
                let lv = self.eval_expr(left, env)?;
                let rv = self.eval_expr(right, env)?;
                eval_binary(*op, &lv, &rv)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                match op {
                    UnaryOp::Neg => negate(&value),
                    UnaryOp::Plus => match value {
                        Value::Function(f) => Err(EvalError::TypeMismatch(format!(
                            "cannot apply unary + to function {f}"
                        ))),
                        v => Ok(v),
                    },
                }
            }
            ExprKind::Paren(inner) => self.eval_expr(inner, env),
        }
    }

    fn eval_identifier(&self, name: &str, env: &Env<'_>) -> EvalResult<Value> {
        if let Some(value) = env.get(name) {
            return Ok(value.clone());
        }
        if let Some(n) = builtins::constant(name) {
            return Ok(Value::Number(n));
        }
        if builtins::is_function(name) {
            return Err(EvalError::TypeMismatch(format!(
                "built-in function '{name}' cannot be used as a value"
            )));
        }
        Err(EvalError::UndefinedVariable(name.to_string()))
    }

    fn eval_call(&mut self, name: &str, args: &[Expr], env: &Env<'_>) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, env)?);
        }
        match env.get(name) {
            Some(Value::Function(function)) => self.call_function(function, values),
            Some(_) => Err(EvalError::NotCallable(name.to_string())),
            None if builtins::is_function(name) => builtins::call(name, values),
            None if builtins::constant(name).is_some() => {
                Err(EvalError::NotCallable(name.to_string()))
            }
            None => Err(EvalError::UndefinedVariable(name.to_string())),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

fn eval_index(object: Value, index: &Value) -> EvalResult<Value> {
    let mut items = match object {
        Value::Array(items) => items,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "cannot index into {}",
                other.type_name()
            )))
        }
    };
    let Some(i) = index.as_number() else {
        return Err(EvalError::TypeMismatch(format!(
            "index must be a number, got {}",
            index.type_name()
        )));
    };
    let len = items.len();
    if i.fract() != 0.0 || i < 1.0 || i > len as f64 {
        return Err(EvalError::IndexOutOfRange(format!(
            "index {i} for array of length {len}"
        )));
    }
    Ok(items.swap_remove(i as usize - 1))
}

fn eval_binary(op: BinOp, lv: &Value, rv: &Value) -> EvalResult<Value> {
    match op {
        BinOp::Add => elementwise(op, lv, rv, &|a, b| a + b),
        BinOp::Sub => elementwise(op, lv, rv, &|a, b| a - b),
        BinOp::Mul => match (lv, rv) {
            (Value::Array(a), Value::Array(b)) => dot(a, b),
            _ => broadcast(op, lv, rv, &|a, b| a * b),
        },
        BinOp::Div => scalar_right(op, lv, rv, &|a, b| a / b),
        BinOp::Mod => scalar_right(op, lv, rv, &|a, b| a % b),
        BinOp::Pow => scalar_right(op, lv, rv, &f64::powf),
    }
}

fn mismatch(op: BinOp, lv: &Value, rv: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply '{op}' to {} and {}",
        lv.type_name(),
        rv.type_name()
    ))
}

/// Arrays of equal length pair up element by element; numbers broadcast.
fn elementwise(
    op: BinOp,
    lv: &Value,
    rv: &Value,
    f: &dyn Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Err(EvalError::DimensionMismatch {
                    left: a.len(),
                    right: b.len(),
                });
            }
            a.iter()
                .zip(b)
                .map(|(x, y)| elementwise(op, x, y, f))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Array)
        }
        _ => broadcast(op, lv, rv, f),
    }
}

/// Numbers combine directly; a number and an array combine per element.
fn broadcast(op: BinOp, lv: &Value, rv: &Value, f: &dyn Fn(f64, f64) -> f64) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        (Value::Array(items), Value::Number(_)) => items
            .iter()
            .map(|x| elementwise(op, x, rv, f))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::Array),
        (Value::Number(_), Value::Array(items)) => items
            .iter()
            .map(|y| elementwise(op, lv, y, f))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::Array),
        _ => Err(mismatch(op, lv, rv)),
    }
}

/// `/`, `%` and `^`: the right operand must be a number.
fn scalar_right(
    op: BinOp,
    lv: &Value,
    rv: &Value,
    f: &dyn Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        (Value::Array(items), Value::Number(_)) => items
            .iter()
            .map(|x| scalar_right(op, x, rv, f))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::Array),
        _ => Err(mismatch(op, lv, rv)),
    }
}

fn dot(a: &[Value], b: &[Value]) -> EvalResult<Value> {
    if a.len() != b.len() {
        return Err(EvalError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        match (x, y) {
            (Value::Number(x), Value::Number(y)) => sum += x * y,
            _ => {
                return Err(EvalError::TypeMismatch(
                    "'*' between arrays requires flat numeric vectors".to_string(),
                ))
            }
        }
    }
    Ok(Value::Number(sum))
}

fn negate(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(-n)),
        Value::Array(items) => items
            .iter()
            .map(negate)
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::Array),
        Value::Function(f) => Err(EvalError::TypeMismatch(format!(
            "cannot negate function {f}"
        ))),
    }
}
