//! Ollama generation gateway.
//!
//! Implements [`GenerationGateway`] against the Ollama chat API
//! (`POST {base}/api/chat` with `stream: true`). The response is NDJSON:
//! one JSON object per line, each carrying an incremental `message` delta
//! and a `done` flag on the final line. Tool calls arrive on the
//! `message.tool_calls` array and end the round.
//!
//! A spawned reader task drains the byte stream, splits it into lines, and
//! forwards parsed [`GenerationEvent`]s through the channel behind
//! [`GenerationStream`]. Line parsing lives in [`line_to_events`] so it can
//! be tested without a live server.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use toolgate_application::ports::generation::{
    GenerationError, GenerationGateway, GenerationStream,
};
use toolgate_domain::tool::entities::{ToolCall, ToolDescriptor};
use toolgate_domain::turn::{
    entities::TurnMode,
    stream::GenerationEvent,
    transcript::{Transcript, TranscriptEntry},
};

use super::prompts::system_prompt;
use super::schema::render_tools_schema;

/// Streaming gateway to a local Ollama server.
pub struct OllamaGenerationGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerationGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
        mode: TurnMode,
    ) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": build_messages(transcript, mode),
            "tools": render_ollama_tools(tools),
            "stream": true,
        })
    }
}

/// Transcript entries as Ollama chat messages, system prompt first.
fn build_messages(transcript: &Transcript, mode: TurnMode) -> Vec<serde_json::Value> {
    let mut messages = vec![serde_json::json!({
        "role": "system",
        "content": system_prompt(mode),
    })];

    for entry in transcript.entries() {
        match entry {
            TranscriptEntry::User(text) => {
                messages.push(serde_json::json!({"role": "user", "content": text}));
            }
            TranscriptEntry::Assistant(text) => {
                messages.push(serde_json::json!({"role": "assistant", "content": text}));
            }
            TranscriptEntry::ToolExchange { call, output } => {
                // The assistant's request, then the tool's payload
                messages.push(serde_json::json!({
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "function": {
                            "name": call.tool_name,
                            "arguments": call.arguments,
                        }
                    }],
                }));
                messages.push(serde_json::json!({
                    "role": "tool",
                    "content": output.to_string(),
                }));
            }
        }
    }

    messages
}

/// Wrap the neutral schemas in Ollama's function-tool envelope.
fn render_ollama_tools(tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
    render_tools_schema(tools)
        .into_iter()
        .map(|mut schema| {
            let parameters = schema
                .as_object_mut()
                .and_then(|o| o.remove("input_schema"))
                .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}));
            serde_json::json!({
                "type": "function",
                "function": {
                    "name": schema["name"],
                    "description": schema["description"],
                    "parameters": parameters,
                }
            })
        })
        .collect()
}

/// Parse one NDJSON line from the chat stream into zero or more events.
///
/// Blank lines yield nothing. A line that is not valid JSON is a
/// `MalformedStream` error.
pub(crate) fn line_to_events(line: &str) -> Result<Vec<GenerationEvent>, GenerationError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| GenerationError::MalformedStream(format!("{}: {}", e, line)))?;

    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        return Ok(vec![GenerationEvent::Error(error.to_string())]);
    }

    let mut events = Vec::new();
    let message = &value["message"];

    if let Some(content) = message["content"].as_str()
        && !content.is_empty()
    {
        events.push(GenerationEvent::Chunk(content.to_string()));
    }

    if let Some(tool_calls) = message["tool_calls"].as_array() {
        for tool_call in tool_calls {
            let function = &tool_call["function"];
            let Some(name) = function["name"].as_str() else {
                return Err(GenerationError::MalformedStream(
                    "tool call without a function name".to_string(),
                ));
            };
            let mut call = ToolCall::new(name);
            if let Some(arguments) = function["arguments"].as_object() {
                for (key, arg) in arguments {
                    call.arguments.insert(key.clone(), arg.clone());
                }
            }
            events.push(GenerationEvent::ToolCall(call));
        }
    }

    if value["done"].as_bool() == Some(true) {
        events.push(GenerationEvent::Completed);
    }

    Ok(events)
}

#[async_trait]
impl GenerationGateway for OllamaGenerationGateway {
    async fn generate(
        &self,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
        mode: TurnMode,
    ) -> Result<GenerationStream, GenerationError> {
        let body = self.build_request(transcript, tools, mode);
        debug!(
            model = %self.model,
            messages = transcript.len() + 1,
            tools = tools.len(),
            "Starting generation round"
        );

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            'read: while let Some(chunk) = byte_stream.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(GenerationEvent::Error(format!("stream read failed: {}", e)))
                            .await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].to_string();
                    buffer.drain(..=newline);

                    match line_to_events(&line) {
                        Ok(events) => {
                            for event in events {
                                let terminal = event.is_terminal();
                                if tx.send(event).await.is_err() {
                                    // Receiver gone; the turn was torn down
                                    return;
                                }
                                if terminal {
                                    break 'read;
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Dropping malformed stream line");
                            let _ = tx.send(GenerationEvent::Error(e.to_string())).await;
                            return;
                        }
                    }
                }
            }
        });

        Ok(GenerationStream::new(rx))
    }
}
