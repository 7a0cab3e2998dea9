//! Configuration loading and file structures

pub mod file_config;
pub mod loader;

pub use file_config::{
    FileConfig, FileExecutionConfig, FileGenerationConfig, FileLoggingConfig, FileRemoteConfig,
};
pub use loader::ConfigLoader;
