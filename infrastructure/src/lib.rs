//! Infrastructure layer for toolgate
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the tool catalog with its providers, the streaming
//! generation backend, configuration file loading, and turn logging.

pub mod catalog;
pub mod config;
pub mod generation;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use catalog::ToolCatalog;
pub use config::{ConfigLoader, FileConfig, FileExecutionConfig, FileGenerationConfig, FileRemoteConfig};
pub use generation::{OllamaGenerationGateway, render_tool_schema, render_tools_schema};
pub use logging::JsonlTurnLogger;
pub use providers::{
    HttpToolTransport, LocalToolProvider, RemoteToolProvider, ToolTransport, TransportError,
};
