//! Evaluation limits.

use serde::{Deserialize, Serialize};

/// Host stack reserved per level of expression nesting.
const STACK_BYTES_PER_LEVEL: usize = 64 * 1024;

/// Host stack reserved on top of the per-level budget.
const STACK_BYTES_BASE: usize = 1024 * 1024;

/// Resource limits applied to every `invoke` and `eval`.
///
/// None of the limits changes the meaning of a program that stays within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Evaluation steps allowed per top-level call; one per expression node.
    pub gas_limit: u64,
    /// Maximum number of nested function calls.
    pub max_call_depth: u32,
    /// Maximum number of expression nodes under evaluation at once, counted
    /// across every active call.
    pub max_nesting: u32,
}

impl EvalConfig {
    /// Parse a (possibly partial) JSON object; missing keys keep defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Stack size of the thread that runs an evaluation.
    ///
    /// Large enough that `max_nesting` is always reached before the host
    /// stack runs out.
    pub fn stack_size(&self) -> usize {
        (self.max_nesting as usize)
            .saturating_mul(STACK_BYTES_PER_LEVEL)
            .saturating_add(STACK_BYTES_BASE)
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            gas_limit: u64::MAX,
            max_call_depth: 512,
            max_nesting: 2048,
        }
    }
}
