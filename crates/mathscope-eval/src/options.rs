//! Configuration for [`MathEngine`](crate::MathEngine).

use mathscope_parser::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Limits applied while compiling and evaluating definitions.
///
/// ```
/// use mathscope_eval::EngineOptions;
///
/// let options = EngineOptions {
///     max_depth: 32,
///     ..EngineOptions::default()
/// };
/// assert_eq!(options.gas_limit, 100_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Maximum expression nesting depth accepted by the parser.
    ///
    /// Default: 64
    pub max_depth: u32,

    /// Maximum number of expression nodes visited while evaluating one
    /// definition or one top-level function call.
    ///
    /// Default: 100_000
    pub gas_limit: u64,

    /// Maximum expression nesting during evaluation, counted across nested
    /// function calls. Deeper evaluation fails with `DepthExceeded` instead
    /// of exhausting the native stack.
    ///
    /// Default: 256
    pub max_eval_depth: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            gas_limit: 100_000,
            max_eval_depth: 256,
        }
    }
}
