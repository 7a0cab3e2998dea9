//! Streaming events produced by the generation capability.
//!
//! [`GenerationEvent`] bridges infrastructure-level streaming (e.g. NDJSON
//! chunks from an HTTP backend) to the application layer's turn state
//! machine: plain text chunks interleave with structured tool-call
//! requests, terminated by `Completed` or `Error`.

use crate::tool::entities::ToolCall;

/// An event in a streaming generation response.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// A text chunk from the model.
    Chunk(String),
    /// The model requests a tool invocation. The turn suspends generation,
    /// executes the call, and resumes with the result in the transcript.
    ToolCall(ToolCall),
    /// Natural end of the generation round.
    Completed,
    /// An error that occurred during streaming.
    Error(String),
}

impl GenerationEvent {
    /// Returns the text content if this is a `Chunk` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationEvent::Chunk(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the generation round.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationEvent::Completed | GenerationEvent::Error(_))
    }
}
