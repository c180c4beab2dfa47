//! Span helpers for proxied upstream calls

use crate::attributes::*;
use tracing::Span;
use tracing::field::Empty;

/// Open the span for one proxied request.
///
/// The upstream URL, duration and response status are not known yet; they
/// are declared empty and filled in by [`record_upstream_call`] and
/// [`record_response_status`] while the span is still open, so everything
/// logged for the request nests under it.
pub fn proxy_span(route: &str, method: &str, credentialed: bool) -> Span {
    tracing::info_span!(
        "proxy_call",
        { PROXY_ROUTE } = %route,
        { HTTP_REQUEST_METHOD } = %method,
        { PROXY_CREDENTIALED } = credentialed,
        { URL_FULL } = Empty,
        { PROXY_DURATION_MS } = Empty,
        { HTTP_RESPONSE_STATUS_CODE } = Empty,
    )
}

/// Record the forwarded URL and how long the upstream took.
pub fn record_upstream_call(span: &Span, upstream_url: &str, duration_ms: u64) {
    span.record(URL_FULL, upstream_url);
    span.record(PROXY_DURATION_MS, duration_ms);
}

/// Record the status the proxy answered with.
pub fn record_response_status(span: &Span, status: u16) {
    span.record(HTTP_RESPONSE_STATUS_CODE, status);
}
