//! Execution parameters — turn loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound the tool
//! loop in [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turn loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum tool-call rounds in a single turn. Exceeding this forces
    /// finalization with the fallback text, which is what prevents a
    /// generation backend that always requests another tool from looping
    /// forever.
    pub max_tool_rounds: usize,
    /// Timeout for a single provider invocation.
    pub tool_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_rounds: 3,
            tool_timeout: Duration::from_secs(10),
        }
    }
}

impl ExecutionParams {
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }
}
