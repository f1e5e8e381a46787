//! mathscope scope evaluator as a WASM module for browser environments.
//!
//! A [`ScopeSession`] keeps the state of the previous pass on the Rust side,
//! so every call after the first is an incremental update.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { ScopeSession } from 'mathscope-wasm';
//!
//! await init();
//!
//! const session = new ScopeSession('{"gas_limit": 50000}');
//! const result = session.evaluate({ c: "c = -1", b: "b = c + 4", a: "a = b/2 - c" });
//! // { scope: { a: 2.5, b: 3, c: -1 }, errors: {}, updated: ["a", "b", "c"] }
//! ```

use mathscope::{EvalResult, ScopeEvaluator, ScopeState, SymbolSet};
use mathscope_eval::{EngineOptions, MathEngine, Value};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// An evaluator plus the state of its last pass.
#[wasm_bindgen]
pub struct ScopeSession {
    evaluator: ScopeEvaluator<MathEngine>,
    state: Option<ScopeState<MathEngine>>,
}

#[wasm_bindgen]
impl ScopeSession {
    /// Create a session. `options_json` is an optional JSON object with
    /// `max_depth`, `gas_limit` and `max_eval_depth`; missing fields take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<ScopeSession, JsError> {
        let options = parse_options(options_json.as_deref())
            .map_err(|e| JsError::new(&format!("invalid options: {e}")))?;
        Ok(Self::with_options(options))
    }

    /// Evaluate a `{ name: definition }` object.
    ///
    /// Returns `{ scope, errors, updated }`. Numbers and nested arrays come
    /// back as-is, except non-finite numbers, which become `"Infinity"`,
    /// `"-Infinity"` or `"NaN"`. Functions are rendered as their signature,
    /// e.g. `"f(x, y)"`.
    pub fn evaluate(&mut self, symbols: JsValue) -> Result<JsValue, JsError> {
        let symbols: SymbolSet = serde_wasm_bindgen::from_value(symbols)
            .map_err(|e| JsError::new(&format!("invalid symbol set: {e}")))?;
        let result = self.run(symbols);
        result
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Like [`evaluate`](Self::evaluate), with JSON text in and out.
    ///
    /// Malformed input yields `{"error": "..."}` instead of a result.
    pub fn evaluate_json(&mut self, symbols_json: &str) -> String {
        let symbols: SymbolSet = match serde_json::from_str(symbols_json) {
            Ok(symbols) => symbols,
            Err(e) => return error_json(&format!("invalid symbol set: {e}")),
        };
        let result = self.run(symbols);
        serde_json::to_string(result)
            .unwrap_or_else(|e| error_json(&format!("serialization error: {e}")))
    }

    /// Forget the previous pass; the next call evaluates from scratch.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl ScopeSession {
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            evaluator: ScopeEvaluator::new(MathEngine::with_options(options)),
            state: None,
        }
    }

    /// Evaluate against the previous pass and keep the new state.
    ///
    /// A set equal to the previous one reuses the previous `Rc`, so nothing
    /// is recomputed.
    fn run(&mut self, symbols: SymbolSet) -> &EvalResult<Value> {
        let symbols = match &self.state {
            Some(previous) if **previous.symbols() == symbols => Rc::clone(previous.symbols()),
            _ => Rc::new(symbols),
        };
        let next = self.evaluator.evaluate(symbols, self.state.as_ref());
        self.state.insert(next).result()
    }
}

/// Return the mathscope version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn parse_options(json: Option<&str>) -> Result<EngineOptions, serde_json::Error> {
    match json {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text),
        _ => Ok(EngineOptions::default()),
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
