//! HTTP server for the API playground: the three same-origin proxy routes and
//! the endpoint catalog.

pub mod error;
pub mod proxy;
pub mod routes;
pub mod upstream;

pub use error::{ApiError, ProxyError};
pub use proxy::{API_KEY_HEADER, PROXY_DURATION_HEADER, PROXY_STATUS_HEADER, ProxyCore};
pub use routes::{AppState, create_router};
pub use upstream::{ReqwestUpstream, Upstream, UpstreamRequest, UpstreamResponse};
