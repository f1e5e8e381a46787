//! The scope evaluator: evaluates a whole symbol set, from scratch or as an
//! incremental patch on top of the previous pass.
//!
//! State between passes is owned by the caller. Each call to
//! [`ScopeEvaluator::evaluate`] takes the previous [`ScopeState`] by
//! reference and returns a new one; the previous state is never mutated.

use crate::filter::remove_unmet;
use crate::graph::{build_child_map, descendants, DependencyGraph};
use crate::order::evaluation_order;
use mathscope_types::{CompiledExpression, ExpressionEngine, Scope, SymbolError, SyntaxErrors};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::{debug, trace};

/// Symbol name to definition text, e.g. `"a" => "a = b/2 - c"`.
pub type SymbolSet = BTreeMap<String, String>;

/// Outcome of one pass.
///
/// Every symbol of the pass is in exactly one of `scope` and `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalResult<V> {
    pub scope: Scope<V>,
    pub errors: BTreeMap<String, SymbolError>,
    /// Symbols whose entry was recomputed by this pass.
    pub updated: BTreeSet<String>,
}

impl<V> Default for EvalResult<V> {
    fn default() -> Self {
        Self {
            scope: Scope::new(),
            errors: BTreeMap::new(),
            updated: BTreeSet::new(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Diff
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    /// Present in both sets with different text.
    pub changed: BTreeSet<String>,
}

impl SymbolDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Adding or removing a symbol can rewire the graph anywhere.
    pub fn needs_full_pass(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

pub fn diff_symbols(new: &SymbolSet, old: &SymbolSet) -> SymbolDiff {
    let mut diff = SymbolDiff::default();
    for (name, text) in new {
        match old.get(name) {
            None => {
                diff.added.insert(name.clone());
            }
            Some(old_text) if old_text != text => {
                diff.changed.insert(name.clone());
            }
            Some(_) => {}
        }
    }
    diff.removed = old
        .keys()
        .filter(|name| !new.contains_key(*name))
        .cloned()
        .collect();
    diff
}

// ══════════════════════════════════════════════════════════════════════════════
// State
// ══════════════════════════════════════════════════════════════════════════════

/// A definition compiled by an earlier pass, reused while its text is
/// unchanged.
struct CompiledEntry<C> {
    text: String,
    compiled: Result<Rc<C>, SyntaxErrors>,
}

impl<C> Clone for CompiledEntry<C> {
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            compiled: self.compiled.clone(),
        }
    }
}

impl<C> CompiledEntry<C> {
    fn free_variables(&self) -> &[String]
    where
        C: CompiledExpression,
    {
        match &self.compiled {
            Ok(compiled) => compiled.free_variables(),
            Err(_) => &[],
        }
    }
}

type CompileCache<C> = BTreeMap<String, CompiledEntry<C>>;

/// Everything one pass produced that the next pass needs.
///
/// Cloning is cheap: the contents are shared.
pub struct ScopeState<E: ExpressionEngine> {
    symbols: Rc<SymbolSet>,
    result: Rc<EvalResult<E::Value>>,
    compiled: Rc<CompileCache<E::Compiled>>,
}

impl<E: ExpressionEngine> Clone for ScopeState<E> {
    fn clone(&self) -> Self {
        Self {
            symbols: Rc::clone(&self.symbols),
            result: Rc::clone(&self.result),
            compiled: Rc::clone(&self.compiled),
        }
    }
}

impl<E: ExpressionEngine> ScopeState<E> {
    pub fn symbols(&self) -> &Rc<SymbolSet> {
        &self.symbols
    }

    pub fn result(&self) -> &EvalResult<E::Value> {
        &self.result
    }

    pub fn scope(&self) -> &Scope<E::Value> {
        &self.result.scope
    }

    pub fn errors(&self) -> &BTreeMap<String, SymbolError> {
        &self.result.errors
    }

    pub fn updated(&self) -> &BTreeSet<String> {
        &self.result.updated
    }

    /// Whether `self` and `other` are the same pass, not merely equal.
    pub fn same_pass(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.result, &other.result)
    }
}

impl<E: ExpressionEngine> std::fmt::Debug for ScopeState<E>
where
    E::Value: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeState")
            .field("symbols", &self.symbols)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Evaluator
// ══════════════════════════════════════════════════════════════════════════════

/// Drives an [`ExpressionEngine`] over a whole [`SymbolSet`].
///
/// ```
/// use mathscope::{ScopeEvaluator, SymbolSet};
/// use mathscope_eval::{MathEngine, Value};
/// use std::rc::Rc;
///
/// let evaluator = ScopeEvaluator::new(MathEngine::new());
/// let mut symbols = SymbolSet::new();
/// symbols.insert("c".into(), "c = -1".into());
/// symbols.insert("b".into(), "b = c + 4".into());
/// symbols.insert("a".into(), "a = b/2 - c".into());
///
/// let state = evaluator.evaluate(Rc::new(symbols.clone()), None);
/// assert_eq!(state.scope()["a"], Value::Number(2.5));
///
/// symbols.insert("c".into(), "c = 2".into());
/// let state = evaluator.evaluate(Rc::new(symbols), Some(&state));
/// assert_eq!(state.scope()["a"], Value::Number(1.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScopeEvaluator<E> {
    engine: E,
}

impl<E: ExpressionEngine> ScopeEvaluator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Evaluate `symbols`, reusing `previous` where possible.
    ///
    /// - the same `Rc` as the previous pass returns the previous state;
    /// - an added or removed symbol triggers a full pass;
    /// - otherwise only the changed symbols and their dependents are
    ///   re-evaluated, on a copy of the previous scope.
    pub fn evaluate(&self, symbols: Rc<SymbolSet>, previous: Option<&ScopeState<E>>) -> ScopeState<E> {
        let Some(previous) = previous else {
            return self.full_pass(symbols, None);
        };
        if Rc::ptr_eq(&symbols, &previous.symbols) {
            trace!("symbol set unchanged, reusing previous pass");
            return previous.clone();
        }

        let diff = diff_symbols(&symbols, &previous.symbols);
        if diff.needs_full_pass() {
            debug!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                "symbols added or removed"
            );
            self.full_pass(symbols, Some(previous))
        } else {
            self.incremental_pass(symbols, previous, &diff.changed)
        }
    }

    /// Compile every definition, reusing entries whose text is unchanged.
    fn compile_all(
        &self,
        symbols: &SymbolSet,
        previous: Option<&ScopeState<E>>,
    ) -> CompileCache<E::Compiled> {
        symbols
            .iter()
            .map(|(name, text)| {
                let cached = previous
                    .and_then(|p| p.compiled.get(name))
                    .filter(|entry| entry.text == *text);
                let entry = match cached {
                    Some(entry) => entry.clone(),
                    None => {
                        trace!(symbol = %name, "compiling");
                        CompiledEntry {
                            text: text.clone(),
                            compiled: self.engine.compile(text).map(Rc::new),
                        }
                    }
                };
                (name.clone(), entry)
            })
            .collect()
    }

    fn graph_of(&self, compiled: &CompileCache<E::Compiled>) -> DependencyGraph {
        build_child_map(
            compiled
                .iter()
                .map(|(name, entry)| (name.as_str(), entry.free_variables())),
            |name| self.engine.is_builtin(name),
        )
    }

    fn full_pass(&self, symbols: Rc<SymbolSet>, previous: Option<&ScopeState<E>>) -> ScopeState<E> {
        let compiled = self.compile_all(&symbols, previous);
        let graph = self.graph_of(&compiled);
        let filtered = remove_unmet(&compiled, &graph.unmet);
        let children = if filtered.is_unchanged() {
            graph.children
        } else {
            self.graph_of(&filtered.symbols).children
        };
        let plan = evaluation_order(&children, None);

        let mut result = EvalResult {
            scope: Scope::new(),
            errors: filtered.errors,
            updated: symbols.keys().cloned().collect(),
        };
        for (name, cycle) in plan.cycles {
            result.errors.insert(name, SymbolError::Cycle { cycle });
        }
        for name in &plan.order {
            self.evaluate_symbol(name, &compiled, &mut result);
        }

        debug!(
            symbols = symbols.len(),
            evaluated = plan.order.len(),
            errors = result.errors.len(),
            "full pass"
        );
        ScopeState {
            symbols,
            result: Rc::new(result),
            compiled: Rc::new(compiled),
        }
    }

    fn incremental_pass(
        &self,
        symbols: Rc<SymbolSet>,
        previous: &ScopeState<E>,
        changed: &BTreeSet<String>,
    ) -> ScopeState<E> {
        let compiled = self.compile_all(&symbols, Some(previous));
        let graph = self.graph_of(&compiled);
        let touched = descendants(changed.iter().map(String::as_str), &graph.children);
        let filtered = remove_unmet(&compiled, &graph.unmet);
        let children = if filtered.is_unchanged() {
            graph.children
        } else {
            self.graph_of(&filtered.symbols).children
        };
        let plan = evaluation_order(&children, Some(changed));

        // A loop outside the changed closure can still block symbols inside
        // it; such a loop already existed in the previous pass.
        let had_cycles = previous
            .result
            .errors
            .values()
            .any(|e| matches!(e, SymbolError::Cycle { .. }));
        let cycles = if plan.cycles.is_empty() && !had_cycles {
            plan.cycles
        } else {
            evaluation_order(&children, None).cycles
        };

        // Copy, never mutate: other holders of the previous pass keep it.
        let mut result = EvalResult {
            scope: previous.result.scope.clone(),
            errors: filtered.errors,
            updated: touched,
        };
        for (name, cycle) in cycles {
            result.errors.insert(name, SymbolError::Cycle { cycle });
        }
        for name in result.errors.keys() {
            result.scope.remove(name);
        }
        for name in &plan.order {
            if !result.errors.contains_key(name) {
                self.evaluate_symbol(name, &compiled, &mut result);
            }
        }

        // A previous error survives only while the symbol has no value.
        for (name, error) in &previous.result.errors {
            if symbols.contains_key(name)
                && !result.scope.contains_key(name)
                && !result.errors.contains_key(name)
            {
                result.errors.insert(name.clone(), error.clone());
            }
        }

        debug!(
            changed = changed.len(),
            evaluated = plan.order.len(),
            errors = result.errors.len(),
            "incremental pass"
        );
        ScopeState {
            symbols,
            result: Rc::new(result),
            compiled: Rc::new(compiled),
        }
    }

    /// Evaluate one symbol against the scope built so far and record the
    /// outcome in exactly one of `scope` and `errors`.
    fn evaluate_symbol(
        &self,
        name: &str,
        compiled: &CompileCache<E::Compiled>,
        result: &mut EvalResult<E::Value>,
    ) {
        let Some(entry) = compiled.get(name) else {
            return;
        };
        let outcome = match &entry.compiled {
            Ok(expr) => expr.evaluate(&result.scope).map_err(SymbolError::from),
            Err(errors) => Err(SymbolError::from(errors.clone())),
        };
        match outcome {
            Ok(value) => {
                trace!(symbol = name, "evaluated");
                result.errors.remove(name);
                result.scope.insert(name.to_string(), value);
            }
            Err(error) => {
                trace!(symbol = name, %error, "evaluation failed");
                result.scope.remove(name);
                result.errors.insert(name.to_string(), error);
            }
        }
    }
}
