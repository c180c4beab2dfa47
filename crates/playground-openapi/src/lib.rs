//! # Playground OpenAPI
//!
//! Turns the Passport OpenAPI document into the endpoint catalog the
//! playground renders and sends requests against.
//!
//! ## Features
//!
//! - Parse OpenAPI v3.0 documents (JSON and YAML) into a flat endpoint list
//! - Append the Human ID Individual Verification endpoints
//! - Attach display names, slugs, ordering and sample responses
//! - Build request URLs and check which requests are ready to send
//! - Cache the remote document with periodic revalidation
//!
//! ## Example
//!
//! ```no_run
//! use playground_openapi::{SpecLoader, catalog};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let loader = SpecLoader::new("https://api.passport.xyz/v2/openapi.json", Duration::from_secs(3600));
//! let snapshot = loader.snapshot().await?;
//!
//! for group in catalog::sorted_groups(&snapshot.endpoints) {
//!     println!("{} ({} endpoints)", group.display_name, group.endpoints.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
mod error;
pub mod individual;
mod loader;
mod parser;
pub mod registry;
mod types;
mod url;

pub use catalog::{EndpointDetail, EndpointGroup, NavigationEntry, NavigationSection};
pub use error::{OpenApiError, Result};
pub use individual::individual_verification_endpoints;
pub use loader::{SpecLoader, SpecSnapshot};
pub use parser::{DEFAULT_BASE_URL, DEFAULT_TAG, OpenApiParser, strip_html_tags};
pub use registry::{EndpointMetadata, KnownEndpoint, UpstreamApi};
pub use types::{
    HttpMethod, Parameter, ParameterLocation, ParameterSchema, ParamValues, ParsedEndpoint,
};
pub use url::{build_url, can_send_request, encode_component};
