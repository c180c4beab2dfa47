//! # Playground Client
//!
//! The browser-side half of the playground: turns a filled-in request draft
//! into a call against one of the local proxy routes, executes it, and renders
//! copy-paste code samples for the same request.
//!
//! ## Example
//!
//! ```no_run
//! use playground_client::{ProxyRequestBuilder, RequestExecutor};
//! use playground_core::UpstreamConfig;
//! use playground_openapi::HttpMethod;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = ProxyRequestBuilder::new("http://localhost:3000", &UpstreamConfig::default())?;
//! let request = builder.build_proxied_request(
//!     HttpMethod::Get,
//!     "https://api.holonym.io/sybil-resistance/phone/optimism?user=0xABC&action-id=123456789",
//!     None,
//! )?;
//!
//! let response = RequestExecutor::new().execute(&request).await;
//! println!("{} {} in {}ms", response.status, response.status_text, response.duration);
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod drafts;
mod error;
mod executor;
mod proxy;

pub use codegen::{CODE_SAMPLE_API_KEY, CodeLanguage, CodeSampleParams, generate};
pub use drafts::{GlobalParams, GlobalValues, RequestDraft};
pub use error::{ClientError, Result};
pub use executor::{NETWORK_ERROR, NormalizedResponse, RequestExecutor};
pub use proxy::{
    ApiRequest, ProxiedRequest, ProxyRequestBuilder, ProxyRoute, ProxyTarget, PATH_PARAM,
    build_direct_request, decode_proxied_target,
};
