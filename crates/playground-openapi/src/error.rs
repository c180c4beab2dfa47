//! Error types for loading and normalizing OpenAPI documents.

use thiserror::Error;

/// Result type for OpenAPI operations.
pub type Result<T> = std::result::Result<T, OpenApiError>;

/// Errors that can occur while fetching, parsing or normalizing a spec.
#[derive(Error, Debug)]
pub enum OpenApiError {
    /// OpenAPI spec parsing error
    #[error("Failed to parse OpenAPI spec: {0}")]
    ParseError(String),

    /// The spec server answered with a non-success status
    #[error("Failed to fetch OpenAPI spec: {status} {reason}")]
    FetchFailed { status: u16, reason: String },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two endpoints ended up with the same id after merging
    #[error("Duplicate endpoint id '{0}'")]
    DuplicateEndpoint(String),

    /// Endpoint not found
    #[error("Endpoint '{0}' not found")]
    EndpointNotFound(String),
}
