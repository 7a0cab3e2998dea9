//! Generation backend adapters

pub mod ollama;
pub mod prompts;
pub mod schema;

pub use ollama::OllamaGenerationGateway;
pub use schema::{render_tool_schema, render_tools_schema};
