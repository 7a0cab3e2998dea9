//! Remote tool provider
//!
//! A [`RemoteToolProvider`] is a handle to tools hosted on an external
//! process. The wire protocol is abstracted behind [`ToolTransport`]; the
//! provider only maps transport outcomes into the domain's
//! [`ProviderError`] taxonomy so that connection trouble surfaces as
//! `Unreachable` (and, downstream, as `ProviderUnreachable`).
//!
//! [`HttpToolTransport`] is the concrete transport shipped with the
//! gateway: plain JSON over HTTP (`GET {base}/tools`,
//! `POST {base}/tools/{name}`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use toolgate_domain::tool::{
    entities::{ToolCall, ToolDescriptor},
    provider::{ProviderError, ToolProvider},
};

/// Transport-level errors, kept separate from provider semantics.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the remote process at all
    #[error("Connect failed: {0}")]
    Connect(String),

    /// The remote process answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body could not be decoded
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Wire transport for a remote tool host.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Fetch the tool listing from the remote host.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, TransportError>;

    /// Invoke a named tool on the remote host.
    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError>;
}

/// JSON-over-HTTP transport.
pub struct HttpToolTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpToolTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn tools_url(&self) -> String {
        format!("{}/tools", self.base_url.trim_end_matches('/'))
    }

    fn call_url(&self, name: &str) -> String {
        format!("{}/tools/{}", self.base_url.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl ToolTransport for HttpToolTransport {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, TransportError> {
        let response = self
            .client
            .get(self.tools_url())
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<Vec<ToolDescriptor>>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .post(self.call_url(name))
            .json(arguments)
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Tool provider backed by a remote host.
pub struct RemoteToolProvider {
    id: String,
    name: String,
    transport: Arc<dyn ToolTransport>,
}

impl RemoteToolProvider {
    pub fn new(name: impl Into<String>, transport: Arc<dyn ToolTransport>) -> Self {
        let name = name.into();
        Self {
            id: format!("remote:{}", name),
            name,
            transport,
        }
    }

    /// Remote provider over plain JSON/HTTP.
    pub fn over_http(
        name: impl Into<String>,
        client: reqwest::Client,
        base_url: impl Into<String>,
    ) -> Self {
        Self::new(name, Arc::new(HttpToolTransport::new(client, base_url)))
    }
}

fn listing_error(e: TransportError) -> ProviderError {
    match e {
        TransportError::Connect(msg) => ProviderError::Unreachable(msg),
        other => ProviderError::ListingFailed(other.to_string()),
    }
}

fn invoke_error(e: TransportError) -> ProviderError {
    match e {
        TransportError::Connect(msg) => ProviderError::Unreachable(msg),
        other => ProviderError::ExecutionFailed(other.to_string()),
    }
}

#[async_trait]
impl ToolProvider for RemoteToolProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        let tools = self
            .transport
            .list_tools()
            .await
            .map_err(listing_error)?;
        debug!(provider = %self.id, tools = tools.len(), "Remote listing fetched");
        Ok(tools)
    }

    async fn invoke(&self, call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
        self.transport
            .call_tool(&call.tool_name, &call.arguments)
            .await
            .map_err(invoke_error)
    }
}
