//! Turn entities

use serde::{Deserialize, Serialize};

/// Generation mode for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// Tool-optional: the model may answer from its own knowledge
    Open,
    /// Tool-mandatory: an answer without a successful tool call is replaced
    /// by the fallback text
    ToolRequired,
}

impl TurnMode {
    pub fn as_str(&self) -> &str {
        match self {
            TurnMode::Open => "open",
            TurnMode::ToolRequired => "tool_required",
        }
    }

    pub fn requires_tool(&self) -> bool {
        matches!(self, TurnMode::ToolRequired)
    }
}

impl std::fmt::Display for TurnMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for one turn. Created per inbound request, immutable.
#[derive(Debug, Clone)]
pub struct TurnInput {
    /// The user's free-text input
    pub user_text: String,
    /// Generation mode
    pub mode: TurnMode,
}

impl TurnInput {
    pub fn new(user_text: impl Into<String>, mode: TurnMode) -> Self {
        Self {
            user_text: user_text.into(),
            mode,
        }
    }

    pub fn open(user_text: impl Into<String>) -> Self {
        Self::new(user_text, TurnMode::Open)
    }

    pub fn tool_required(user_text: impl Into<String>) -> Self {
        Self::new(user_text, TurnMode::ToolRequired)
    }
}
