//! Application layer for toolgate
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.
//!
//! The centerpiece is [`RunTurnUseCase`], the explicit state machine that
//! drives one chat turn: generation streaming, tool dispatch through
//! [`ToolInvoker`], and policy-screened output.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    generation::{GenerationError, GenerationGateway, GenerationStream},
    turn_logger::{NoTurnLogger, TurnEvent, TurnLogger},
};
pub use use_cases::invoker::{InvocationError, ToolInvoker};
pub use use_cases::run_turn::{RunTurnUseCase, TurnHandle, TurnPhase};
