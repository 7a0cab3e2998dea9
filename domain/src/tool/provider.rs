//! Tool provider abstraction
//!
//! This module defines the [`ToolProvider`] trait, which abstracts sources
//! of callable tools that can be plugged into the catalog.
//!
//! # Provider Types
//!
//! - **LocalToolProvider**: in-process functions registered at startup.
//! - **RemoteToolProvider**: a handle to an external process reachable over
//!   a transport the gateway treats as a black box.
//!
//! Both live in the infrastructure layer; the catalog and the invoker only
//! see this trait.
//!
//! # Failure Semantics
//!
//! `list_tools` failures are soft: the catalog skips the provider for that
//! refresh cycle and keeps its last-known listing. `invoke` failures are
//! normalized by the invoker into a closed set of invocation error kinds
//! and never reach the end user verbatim.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolCall, ToolDescriptor};

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider cannot be reached (transport-level failure)
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    /// Failed to list tools from the provider
    #[error("Listing failed: {0}")]
    ListingFailed(String),

    /// Tool not found in this provider
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed inside the provider
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl ProviderError {
    /// Whether this error is a transport-level reachability failure
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ProviderError::Unreachable(_))
    }
}

/// Tool provider abstraction - a source of one or more tools
///
/// Implementations provide tools from various sources:
/// - `LocalToolProvider`: in-process functions
/// - `RemoteToolProvider`: tools hosted on an external process
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Unique identifier for this provider
    ///
    /// Examples: "local", "remote:mcpserver"
    fn id(&self) -> &str;

    /// Display name for diagnostics
    fn display_name(&self) -> &str;

    /// List the tools this provider can currently execute
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError>;

    /// Execute a tool call and return its payload
    ///
    /// The tool_name in the call must match one of the tools returned by
    /// `list_tools()`.
    async fn invoke(&self, call: &ToolCall) -> Result<serde_json::Value, ProviderError>;
}
