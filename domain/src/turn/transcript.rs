//! Turn transcript — the evolving conversation fed to generation
//!
//! The transcript accumulates the user text, any assistant text produced in
//! earlier tool rounds, and every tool exchange. It is re-fed to the
//! generation capability after each tool result so the model can continue
//! with the payload in context.

use serde_json::Value;

use crate::tool::entities::ToolCall;

/// One entry in a turn's transcript
#[derive(Debug, Clone)]
pub enum TranscriptEntry {
    /// The user's message
    User(String),
    /// Assistant text produced by a generation round
    Assistant(String),
    /// A completed tool call and the payload the provider returned
    ToolExchange { call: ToolCall, output: Value },
}

/// Ordered transcript of a single turn
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a transcript with the user's message
    pub fn from_user_text(text: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.push_user(text);
        transcript
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::User(text.into()));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.entries.push(TranscriptEntry::Assistant(text));
        }
    }

    pub fn push_tool_exchange(&mut self, call: ToolCall, output: Value) {
        self.entries.push(TranscriptEntry::ToolExchange { call, output });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tool exchanges recorded so far
    pub fn tool_exchanges(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, TranscriptEntry::ToolExchange { .. }))
            .count()
    }
}
