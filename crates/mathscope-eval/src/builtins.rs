//! Built-in constants and functions (`e`, `pi`, `sin`, `log`, ...).
//!
//! The set of names matches [`mathscope_types::BUILTIN_NAMES`]; a symbol of
//! the same name in scope always wins over the built-in.

use crate::value::Value;
use mathscope_types::EvalError;

pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "e" => Some(std::f64::consts::E),
        "pi" => Some(std::f64::consts::PI),
        _ => None,
    }
}

fn unary(name: &str) -> Option<fn(f64) -> f64> {
    let f: fn(f64) -> f64 = match name {
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "sec" => |x| 1.0 / x.cos(),
        "csc" => |x| 1.0 / x.sin(),
        "cot" => |x| 1.0 / x.tan(),
        "ln" => f64::ln,
        "exp" => f64::exp,
        _ => return None,
    };
    Some(f)
}

pub(crate) fn is_function(name: &str) -> bool {
    name == "log" || unary(name).is_some()
}

/// Call a built-in function. Numeric functions map element-wise over
/// (nested) arrays.
pub(crate) fn call(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    if name == "log" {
        return log(args);
    }
    let f = unary(name).ok_or_else(|| EvalError::NotCallable(name.to_string()))?;
    let [arg] = exactly::<1>(name, args)?;
    map_numbers(name, &arg, &f)
}

/// `log(x)` is the natural logarithm; `log(x, base)` uses `base`.
fn log(args: Vec<Value>) -> Result<Value, EvalError> {
    match args.len() {
        1 => {
            let [x] = exactly::<1>("log", args)?;
            map_numbers("log", &x, &f64::ln)
        }
        2 => {
            let [x, base] = exactly::<2>("log", args)?;
            let base = base.as_number().ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "log base must be a number, got {}",
                    base.type_name()
                ))
            })?;
            let divisor = base.ln();
            map_numbers("log", &x, &|n| n.ln() / divisor)
        }
        found => Err(EvalError::ArityMismatch {
            name: "log".to_string(),
            expected: "1 or 2".to_string(),
            found,
        }),
    }
}

fn exactly<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], EvalError> {
    let found = args.len();
    args.try_into().map_err(|_| EvalError::ArityMismatch {
        name: name.to_string(),
        expected: N.to_string(),
        found,
    })
}

fn map_numbers(name: &str, value: &Value, f: &dyn Fn(f64) -> f64) -> Result<Value, EvalError> {
    match value {
        Value::Number(n) => Ok(Value::Number(f(*n))),
        Value::Array(items) => items
            .iter()
            .map(|item| map_numbers(name, item, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Function(func) => Err(EvalError::TypeMismatch(format!(
            "{name} expects a number or array, got function {func}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscope_types::BUILTIN_NAMES;

    fn num(v: Value) -> f64 {
        v.as_number().expect("number")
    }

    #[test]
    fn test_every_builtin_name_resolves() {
        for name in BUILTIN_NAMES {
            assert!(
                constant(name).is_some() || is_function(name),
                "{name} has no implementation"
            );
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(constant("pi"), Some(std::f64::consts::PI));
        assert_eq!(constant("e"), Some(std::f64::consts::E));
        assert_eq!(constant("sin"), None);
    }

    #[test]
    fn test_trig_reciprocals() {
        let x = 0.7_f64;
        assert!((num(call("sec", vec![x.into()]).unwrap()) - 1.0 / x.cos()).abs() < 1e-12);
        assert!((num(call("csc", vec![x.into()]).unwrap()) - 1.0 / x.sin()).abs() < 1e-12);
        assert!((num(call("cot", vec![x.into()]).unwrap()) - 1.0 / x.tan()).abs() < 1e-12);
    }

    #[test]
    fn test_log_with_and_without_base() {
        assert_eq!(num(call("log", vec![1.0.into()]).unwrap()), 0.0);
        let log10 = num(call("log", vec![1000.0.into(), 10.0.into()]).unwrap());
        assert!((log10 - 3.0).abs() < 1e-12);
        assert!(matches!(
            call("log", vec![]),
            Err(EvalError::ArityMismatch { found: 0, .. })
        ));
    }

    #[test]
    fn test_unary_maps_over_arrays() {
        let result = call("exp", vec![Value::from(vec![0.0, 0.0])]).unwrap();
        assert_eq!(result, Value::from(vec![1.0, 1.0]));
    }

    #[test]
    fn test_unary_arity() {
        let err = call("sin", vec![1.0.into(), 2.0.into()]).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArityMismatch {
                name: "sin".into(),
                expected: "1".into(),
                found: 2
            }
        );
    }
}
