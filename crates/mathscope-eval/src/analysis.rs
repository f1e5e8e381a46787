//! Free-variable analysis.

use mathscope_types::ast::{Definition, Expr, ExprKind};

/// Names referenced by `definition` that it does not bind itself.
///
/// Both plain identifiers and called function names count. Function
/// parameters are bound and excluded. The result has no duplicates and keeps
/// the order in which names first appear.
///
/// ```
/// use mathscope_eval::free_variables;
/// use mathscope_parser::{parse_definition, DEFAULT_MAX_DEPTH};
///
/// let def = parse_definition("f(x, y) = a*x^2 - b*y + sin(x)", DEFAULT_MAX_DEPTH).unwrap();
/// assert_eq!(free_variables(&def), vec!["a", "b", "sin"]);
/// ```
pub fn free_variables(definition: &Definition) -> Vec<String> {
    let bound: Vec<&str> = definition
        .params()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    let mut names = Vec::new();

    // Explicit stack, so deep expressions cannot overflow the call stack.
    let mut pending: Vec<&Expr> = vec![definition.body()];
    while let Some(expr) = pending.pop() {
        match &expr.kind {
            ExprKind::Number(_) => {}
            ExprKind::Identifier(name) => note(&mut names, &bound, name),
            ExprKind::Call { callee, args } => {
                note(&mut names, &bound, &callee.name);
                pending.extend(args.iter().rev());
            }
            ExprKind::Array(items) => pending.extend(items.iter().rev()),
            ExprKind::Index { object, index } => {
                pending.push(index);
                pending.push(object);
            }
            ExprKind::Binary { left, right, .. } => {
                pending.push(right);
                pending.push(left);
            }
            ExprKind::Unary { operand, .. } => pending.push(operand),
            ExprKind::Paren(inner) => pending.push(inner),
        }
    }
    names
}

fn note(names: &mut Vec<String>, bound: &[&str], name: &str) {
    if !bound.contains(&name) && !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
