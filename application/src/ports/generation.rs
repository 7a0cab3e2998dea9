//! Generation gateway port
//!
//! Defines the interface for the underlying language-model capability.
//! The application layer never sees a concrete backend; it consumes a lazy
//! stream of [`GenerationEvent`]s which interleaves text chunks with
//! structured tool-call requests.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use toolgate_domain::tool::entities::ToolDescriptor;
use toolgate_domain::turn::{entities::TurnMode, stream::GenerationEvent, transcript::Transcript};

/// Errors that can occur when talking to the generation backend
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed stream from backend: {0}")]
    MalformedStream(String),

    #[error("Timeout")]
    Timeout,
}

/// Handle for receiving streaming events from a generation round.
///
/// Wraps an `mpsc::Receiver<GenerationEvent>`. The stream ends when the
/// sender emits a terminal event or drops the channel.
pub struct GenerationStream {
    receiver: mpsc::Receiver<GenerationEvent>,
}

impl GenerationStream {
    pub fn new(receiver: mpsc::Receiver<GenerationEvent>) -> Self {
        Self { receiver }
    }

    /// Build a pre-filled stream from a fixed event sequence.
    ///
    /// Useful for adapters that buffer a whole response and for tests.
    pub fn from_events(events: Vec<GenerationEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity matches the event count, so try_send cannot fail
            let _ = tx.try_send(event);
        }
        Self { receiver: rx }
    }

    /// Receive the next event, or `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<GenerationEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text chunks into a single string.
    ///
    /// Tool-call events are ignored. An `Error` event becomes a
    /// `GenerationError::RequestFailed`.
    pub async fn collect_text(mut self) -> Result<String, GenerationError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                GenerationEvent::Chunk(chunk) => full_text.push_str(&chunk),
                GenerationEvent::Completed => break,
                GenerationEvent::Error(e) => return Err(GenerationError::RequestFailed(e)),
                GenerationEvent::ToolCall(_) => {}
            }
        }
        Ok(full_text)
    }
}

/// Gateway to the generation capability
///
/// One call to [`generate`](Self::generate) runs one generation round over
/// the transcript so far. When the model requests a tool, the round ends
/// with a [`GenerationEvent::ToolCall`]; the use case executes the tool,
/// appends the exchange to the transcript, and starts the next round.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(
        &self,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
        mode: TurnMode,
    ) -> Result<GenerationStream, GenerationError>;
}
