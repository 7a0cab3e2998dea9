//! Tool invoker — single tool call execution with timeout and error
//! normalization.
//!
//! The invoker is stateless and safe to call concurrently for independent
//! turns. It takes the turn's [`CatalogSnapshot`], so a concurrent catalog
//! refresh can never change which provider a call routes to mid-turn.
//!
//! Cancellation is cooperative: the caller races the returned future
//! against its cancellation token; dropping the future abandons the
//! in-flight provider call and no partial result is observed.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use toolgate_domain::tool::{
    entities::ToolCall, snapshot::CatalogSnapshot, validation::validate_arguments,
};

/// Invocation fault taxonomy.
///
/// Every way a tool call can fail maps to exactly one of these kinds; the
/// turn state machine maps all of them to the fixed fallback text, so none
/// of the carried detail ever reaches the end user.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Name absent from the turn's snapshot
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments rejected by descriptor validation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Provider did not answer within the configured timeout
    #[error("Provider timed out")]
    ProviderTimeout,

    /// Provider returned an error
    #[error("Provider failure: {0}")]
    ProviderFailure(String),

    /// Transport-level failure reaching a remote provider
    #[error("Provider unreachable: {0}")]
    ProviderUnreachable(String),
}

impl InvocationError {
    /// Stable kind token for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::UnknownTool(_) => "unknown_tool",
            InvocationError::InvalidArguments(_) => "invalid_arguments",
            InvocationError::ProviderTimeout => "provider_timeout",
            InvocationError::ProviderFailure(_) => "provider_failure",
            InvocationError::ProviderUnreachable(_) => "provider_unreachable",
        }
    }
}

/// Executes a single named tool call against a catalog snapshot.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Invoke `call` through the provider recorded in `snapshot`.
    ///
    /// Preconditions enforced here: the name must exist in the snapshot and
    /// the arguments must validate against the descriptor. The provider
    /// call runs under the invoker's timeout.
    pub async fn invoke(
        &self,
        snapshot: &CatalogSnapshot,
        call: &ToolCall,
    ) -> Result<serde_json::Value, InvocationError> {
        let entry = snapshot
            .get(&call.tool_name)
            .ok_or_else(|| InvocationError::UnknownTool(call.tool_name.clone()))?;

        validate_arguments(call, &entry.descriptor).map_err(InvocationError::InvalidArguments)?;

        debug!(
            tool = %call.tool_name,
            provider = entry.provider.id(),
            "Dispatching tool call"
        );

        match tokio::time::timeout(self.timeout, entry.provider.invoke(call)).await {
            Err(_) => Err(InvocationError::ProviderTimeout),
            Ok(Err(e)) if e.is_unreachable() => {
                Err(InvocationError::ProviderUnreachable(e.to_string()))
            }
            Ok(Err(e)) => Err(InvocationError::ProviderFailure(e.to_string())),
            Ok(Ok(payload)) => Ok(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use toolgate_domain::tool::{
        entities::{ToolDescriptor, ToolParameter},
        provider::{ProviderError, ToolProvider},
        snapshot::CatalogEntry,
    };

    enum Behavior {
        Succeed(serde_json::Value),
        Fail,
        Unreachable,
        Hang,
    }

    struct StubProvider {
        behavior: Behavior,
    }

    #[async_trait]
    impl ToolProvider for StubProvider {
        fn id(&self) -> &str {
            "stub"
        }

        fn display_name(&self) -> &str {
            "Stub Provider"
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
            Ok(vec![])
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
            match &self.behavior {
                Behavior::Succeed(v) => Ok(v.clone()),
                Behavior::Fail => Err(ProviderError::ExecutionFailed("boom".into())),
                Behavior::Unreachable => Err(ProviderError::Unreachable("conn refused".into())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(serde_json::Value::Null)
                }
            }
        }
    }

    fn snapshot(descriptor: ToolDescriptor, behavior: Behavior) -> CatalogSnapshot {
        let mut entries = HashMap::new();
        entries.insert(
            descriptor.name.clone(),
            CatalogEntry {
                descriptor,
                provider: Arc::new(StubProvider { behavior }),
            },
        );
        CatalogSnapshot::new(1, entries)
    }

    fn invoker() -> ToolInvoker {
        ToolInvoker::new(Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let snapshot = snapshot(
            ToolDescriptor::new("local_weather", "weather"),
            Behavior::Succeed(serde_json::json!({"condition": "Sunny"})),
        );

        let payload = invoker()
            .invoke(&snapshot, &ToolCall::new("local_weather"))
            .await
            .unwrap();
        assert_eq!(payload["condition"], "Sunny");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let snapshot = CatalogSnapshot::empty();

        let err = invoker()
            .invoke(&snapshot, &ToolCall::new("nonexistent_tool"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::UnknownTool(_)));
        assert_eq!(err.kind(), "unknown_tool");
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let descriptor = ToolDescriptor::new("lookup", "lookup")
            .with_parameter(ToolParameter::new("query", "q", true));
        let snapshot = snapshot(descriptor, Behavior::Succeed(serde_json::Value::Null));

        let err = invoker()
            .invoke(&snapshot, &ToolCall::new("lookup"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let snapshot = snapshot(ToolDescriptor::new("t", "t"), Behavior::Fail);

        let err = invoker()
            .invoke(&snapshot, &ToolCall::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::ProviderFailure(_)));
    }

    #[tokio::test]
    async fn test_provider_unreachable() {
        let snapshot = snapshot(ToolDescriptor::new("t", "t"), Behavior::Unreachable);

        let err = invoker()
            .invoke(&snapshot, &ToolCall::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::ProviderUnreachable(_)));
    }

    #[tokio::test]
    async fn test_provider_timeout() {
        let snapshot = snapshot(ToolDescriptor::new("t", "t"), Behavior::Hang);

        let start = std::time::Instant::now();
        let err = invoker()
            .invoke(&snapshot, &ToolCall::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::ProviderTimeout));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
