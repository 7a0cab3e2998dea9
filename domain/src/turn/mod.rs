//! Turn domain module
//!
//! A turn is one user request/response cycle through the gateway:
//! [`TurnInput`] carries the user text and [`TurnMode`]; the evolving
//! [`Transcript`] feeds generation; [`GenerationEvent`]s stream back.

pub mod entities;
pub mod stream;
pub mod transcript;

pub use entities::{TurnInput, TurnMode};
pub use stream::GenerationEvent;
pub use transcript::{Transcript, TranscriptEntry};
