//! Tool catalog — provider aggregation and snapshot management

pub mod registry;

pub use registry::{RefreshReport, ToolCatalog};
