//! Tool domain module
//!
//! Defines the core abstractions of the gateway's **tool catalog** — how
//! callable capabilities are described, validated, and routed, whether they
//! live in-process or on a remote process.
//!
//! # Overview
//!
//! Every tool is described by a [`ToolDescriptor`] (name, description,
//! parameter schema), invoked via a [`ToolCall`], and sourced from a
//! [`ToolProvider`]. A catalog refresh merges provider listings into an
//! immutable [`CatalogSnapshot`] keyed by name:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ ToolProvider │───▶│ CatalogSnapshot  │───▶│ ToolCall     │
//! │ (listing)    │    │ (immutable view) │    │ (invocation) │
//! └──────────────┘    └──────────────────┘    └──────────────┘
//! ```
//!
//! # Name Uniqueness
//!
//! Tool names are case-sensitive unique within a snapshot. When two
//! providers list the same name, the later provider in registration order
//! wins and the collision is recorded as a conflict — never silently
//! duplicated.
//!
//! # Key Types
//!
//! - [`ToolDescriptor`] — schema for a single tool (name, params)
//! - [`ToolCall`] — an invocation request with arguments
//! - [`ToolProvider`] — abstraction over tool sources (local, remote)
//! - [`CatalogSnapshot`] — immutable point-in-time catalog view
//! - [`validate_arguments`] — pure argument validation against a descriptor

pub mod entities;
pub mod provider;
pub mod snapshot;
pub mod validation;

pub use entities::{ToolCall, ToolDescriptor, ToolParameter};
pub use provider::{ProviderError, ToolProvider};
pub use snapshot::{CatalogEntry, CatalogSnapshot};
pub use validation::validate_arguments;
