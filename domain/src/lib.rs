//! Domain layer for toolgate
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Catalog
//!
//! Tools come from providers (in-process functions or remote processes).
//! A refresh merges every provider's listing into an immutable
//! [`CatalogSnapshot`]; each chat turn owns the snapshot it started with,
//! so tool semantics never change mid-turn.
//!
//! ## Turn
//!
//! One user request/response cycle through the gateway. A turn runs as an
//! explicit state machine in the application layer; this crate holds the
//! value types that flow through it: [`Transcript`], [`GenerationEvent`],
//! [`ToolCall`], and the [`ResponsePolicy`] that screens the final output.

pub mod policy;
pub mod tool;
pub mod turn;

// Re-export commonly used types
pub use policy::{FALLBACK_TEXT, ResponsePolicy};
pub use tool::{
    entities::{ToolCall, ToolDescriptor, ToolParameter},
    provider::{ProviderError, ToolProvider},
    snapshot::{CatalogEntry, CatalogSnapshot},
    validation::validate_arguments,
};
pub use turn::{
    entities::{TurnInput, TurnMode},
    stream::GenerationEvent,
    transcript::{Transcript, TranscriptEntry},
};
