//! API playground workspace.
//!
//! Re-exports the member crates so end-to-end tests and downstream tools can
//! depend on a single package.

pub use playground_client;
pub use playground_core;
pub use playground_openapi;
pub use playground_server;
pub use playground_telemetry;
