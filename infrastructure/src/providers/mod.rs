//! Tool provider adapters
//!
//! Two provider variants feed the catalog:
//!
//! - [`LocalToolProvider`] — in-process functions registered at startup
//! - [`RemoteToolProvider`] — tools hosted on an external process, reached
//!   through a [`ToolTransport`] the gateway treats as a black box

pub mod local;
pub mod remote;

pub use local::LocalToolProvider;
pub use remote::{HttpToolTransport, RemoteToolProvider, ToolTransport, TransportError};
