//! Error responses for the proxy and catalog routes.
//!
//! Every error renders as `{"error": message}` JSON.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use playground_openapi::OpenApiError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// The request carried no `path` query parameter
    #[error("Missing path parameter")]
    MissingPath,

    /// The `path` query parameter does not start with exactly one `/`
    #[error("Invalid path parameter")]
    InvalidPath,

    /// The credentialed route has no key to attach
    #[error(transparent)]
    MissingCredential(#[from] playground_core::Error),

    /// The upstream could not be reached
    #[error("{0}")]
    Upstream(String),

    /// The upstream answered with something other than JSON
    #[error("{0}")]
    InvalidUpstreamBody(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingPath | ProxyError::InvalidPath => StatusCode::BAD_REQUEST,
            ProxyError::MissingCredential(_)
            | ProxyError::Upstream(_)
            | ProxyError::InvalidUpstreamBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors from the catalog routes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Spec(#[from] OpenApiError),

    #[error("No endpoint with slug '{0}'")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Spec(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
