//! Playground server binary.
//!
//! ```bash
//! PASSPORT_API_KEY=... cargo run -p playground-server -- --port 3000
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use playground_core::{LogFormat, PlaygroundConfig};
use playground_server::{AppState, create_router};
use playground_telemetry::init_telemetry;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "playground-server", version, about = "API playground proxy server")]
struct Args {
    /// Path to config.toml (defaults to CONFIG_FILE or a search upward)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Emit JSON logs
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlaygroundConfig::load_from(Some(path.as_path()))?,
        None => PlaygroundConfig::load()?,
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.log_json {
        config.observability.log_format = LogFormat::Json;
    }

    init_telemetry(&config.observability);

    if config.credentials.require_api_key().is_err() {
        warn!("PASSPORT_API_KEY is not set; /api/proxy will answer 500");
    }

    let app = create_router(AppState::from_config(&config));

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Playground server listening on http://{}", addr);
    info!("Spec source: {}", config.spec.url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed to start")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
