//! Use cases

pub mod invoker;
pub mod run_turn;
