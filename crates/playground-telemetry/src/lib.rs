//! # Playground Telemetry
//!
//! Structured logging and OpenTelemetry tracing for the playground server.
//!
//! Every proxied call is recorded as a span carrying the proxy route, the
//! upstream URL and the upstream status, using OpenTelemetry HTTP semantic
//! convention names where one exists.

mod spans;
mod tracer;

pub use spans::{proxy_span, record_response_status, record_upstream_call};
pub use tracer::{init_telemetry, tracer_provider};

/// OpenTelemetry span attribute names used by the playground.
pub mod attributes {
    // HTTP semantic conventions
    pub const HTTP_REQUEST_METHOD: &str = "http.request.method";
    pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";
    pub const URL_FULL: &str = "url.full";

    // Proxy-specific attributes
    pub const PROXY_ROUTE: &str = "proxy.route";
    pub const PROXY_CREDENTIALED: &str = "proxy.credentialed";
    pub const PROXY_DURATION_MS: &str = "proxy.duration_ms";

    // System name constant
    pub const SYSTEM_NAME: &str = "api-playground";
}
