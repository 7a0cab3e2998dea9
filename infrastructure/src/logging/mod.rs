//! Structured turn logging

pub mod jsonl_logger;

pub use jsonl_logger::JsonlTurnLogger;
