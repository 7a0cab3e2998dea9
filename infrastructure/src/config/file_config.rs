//! Configuration file structures.
//!
//! These mirror the TOML layout:
//!
//! ```toml
//! [generation]
//! base_url = "http://localhost:11434"
//! model = "llama3.2"
//!
//! [execution]
//! max_tool_rounds = 3
//! tool_timeout_ms = 10000
//!
//! [logging]
//! turn_log = "turns.jsonl"
//!
//! [[remotes]]
//! name = "mcpserver"
//! base_url = "http://localhost:8080"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use toolgate_application::config::ExecutionParams;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub generation: FileGenerationConfig,
    pub execution: FileExecutionConfig,
    pub logging: FileLoggingConfig,
    pub remotes: Vec<FileRemoteConfig>,
}

/// Generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Base URL of the Ollama server
    pub base_url: String,
    /// Model to use for generation
    pub model: String,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }
}

/// Turn execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Maximum tool rounds per turn
    pub max_tool_rounds: usize,
    /// Per-invocation tool timeout in milliseconds
    pub tool_timeout_ms: u64,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 3,
            tool_timeout_ms: 10_000,
        }
    }
}

impl FileExecutionConfig {
    /// Convert to the application layer's execution parameters.
    pub fn to_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_tool_rounds(self.max_tool_rounds)
            .with_tool_timeout(Duration::from_millis(self.tool_timeout_ms))
    }
}

/// Turn logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Path of the JSONL turn log; logging is off when unset
    pub turn_log: Option<PathBuf>,
}

/// One remote tool host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRemoteConfig {
    /// Name shown in provider IDs (`remote:<name>`)
    pub name: String,
    /// Base URL of the remote tool host
    pub base_url: String,
}
