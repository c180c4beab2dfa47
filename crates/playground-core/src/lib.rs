//! Core configuration and error types shared by the playground crates.

pub mod config;
pub mod error;

// Re-exports
pub use config::{
    CredentialsConfig, LogFormat, ObservabilityConfig, PlaygroundConfig, ServerConfig,
    SpecConfig, UpstreamConfig,
};
pub use error::{Error, Result};
