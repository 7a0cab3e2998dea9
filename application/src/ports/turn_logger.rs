//! Port for structured turn logging.
//!
//! Defines the [`TurnLogger`] trait for recording turn events (turn start,
//! tool calls, tool results, completion) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the turn
//! lifecycle in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured turn event for logging.
pub struct TurnEvent {
    /// Event type identifier (e.g., "turn_started", "tool_call").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TurnEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging turn events to a structured log.
///
/// The `log` method is intentionally synchronous and non-fallible to avoid
/// disrupting the turn state machine — logging failures are silently
/// ignored by implementations.
pub trait TurnLogger: Send + Sync {
    /// Record a turn event.
    fn log(&self, event: TurnEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTurnLogger;

impl TurnLogger for NoTurnLogger {
    fn log(&self, _event: TurnEvent) {}
}
