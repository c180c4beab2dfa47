//! Error types for building playground requests.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Target, origin or proxy URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A proxy URL without the `path` parameter
    #[error("Missing path parameter")]
    MissingProxyPath,

    /// The draft still has required parameters without a value
    #[error("Endpoint '{0}' has unfilled required parameters")]
    MissingRequiredParameters(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
