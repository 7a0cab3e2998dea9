//! Local tool provider
//!
//! Wraps in-process functions as catalog tools. Always reachable; used for
//! tools that need no external process, like the built-in `local_weather`
//! demo tool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use toolgate_domain::tool::{
    entities::{ToolCall, ToolDescriptor},
    provider::{ProviderError, ToolProvider},
};

/// An in-process tool implementation.
pub type LocalToolFn =
    dyn Fn(&ToolCall) -> Result<serde_json::Value, ProviderError> + Send + Sync;

/// Tool provider backed by in-process functions.
pub struct LocalToolProvider {
    id: String,
    descriptors: Vec<ToolDescriptor>,
    handlers: HashMap<String, Arc<LocalToolFn>>,
}

impl LocalToolProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            descriptors: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register an in-process tool (builder form).
    pub fn with_tool<F>(mut self, descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: Fn(&ToolCall) -> Result<serde_json::Value, ProviderError> + Send + Sync + 'static,
    {
        self.handlers
            .insert(descriptor.name.clone(), Arc::new(handler));
        self.descriptors.push(descriptor);
        self
    }

    /// The built-in provider shipped with the gateway: a single
    /// `local_weather` tool with a fixed report.
    pub fn builtin() -> Self {
        Self::new("local").with_tool(
            ToolDescriptor::new(
                "local_weather",
                "Returns the current local weather conditions. Use when the user asks \
                 what the weather is like. No parameters needed.",
            ),
            |_call| {
                Ok(serde_json::json!({
                    "fahrenheit": "20 F",
                    "celsius": "-6.67 C",
                    "condition": "Sunny",
                }))
            },
        )
    }
}

#[async_trait]
impl ToolProvider for LocalToolProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        "Local Tools"
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        Ok(self.descriptors.clone())
    }

    async fn invoke(&self, call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
        let handler = self
            .handlers
            .get(&call.tool_name)
            .ok_or_else(|| ProviderError::ToolNotFound(call.tool_name.clone()))?;
        handler(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_domain::tool::entities::ToolParameter;

    #[tokio::test]
    async fn test_builtin_lists_local_weather() {
        let provider = LocalToolProvider::builtin();
        let tools = provider.list_tools().await.unwrap();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "local_weather");
        assert!(tools[0].parameters.is_empty());
    }

    #[tokio::test]
    async fn test_builtin_weather_payload() {
        let provider = LocalToolProvider::builtin();
        let payload = provider
            .invoke(&ToolCall::new("local_weather"))
            .await
            .unwrap();

        assert_eq!(payload["condition"], "Sunny");
        assert_eq!(payload["fahrenheit"], "20 F");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let provider = LocalToolProvider::builtin();
        let err = provider.invoke(&ToolCall::new("unknown")).await.unwrap_err();
        assert!(matches!(err, ProviderError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_custom_tool_receives_arguments() {
        let provider = LocalToolProvider::new("test").with_tool(
            ToolDescriptor::new("echo", "Echoes its input")
                .with_parameter(ToolParameter::new("text", "Text to echo", true)),
            |call| {
                let text = call.require_string("text").map_err(ProviderError::ExecutionFailed)?;
                Ok(serde_json::json!({"echo": text}))
            },
        );

        let payload = provider
            .invoke(&ToolCall::new("echo").with_arg("text", "hi"))
            .await
            .unwrap();
        assert_eq!(payload["echo"], "hi");
    }
}
