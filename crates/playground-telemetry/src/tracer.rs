//! Tracer setup and management

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use playground_core::{LogFormat, ObservabilityConfig};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Global tracer provider holder
static TRACER_PROVIDER: OnceLock<Arc<TracerProvider>> = OnceLock::new();

/// Initialize logging and OpenTelemetry tracing.
///
/// This sets up:
/// - A tracer provider named after `service_name`, so spans carry OpenTelemetry
///   trace and span ids in the logs
/// - Integration with the tracing subscriber
/// - Pretty or JSON log output, filtered by `RUST_LOG` (default `info`)
///
/// Calling it twice is harmless: the second subscriber install is skipped.
///
/// # Example
///
/// ```rust,no_run
/// use playground_core::ObservabilityConfig;
/// use playground_telemetry::init_telemetry;
///
/// init_telemetry(&ObservabilityConfig::default());
/// ```
pub fn init_telemetry(config: &ObservabilityConfig) {
    let tracer_provider = TracerProvider::builder().build();

    let tracer = tracer_provider.tracer(config.service_name().to_string());
    let _ = TRACER_PROVIDER.set(Arc::new(tracer_provider));

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let (pretty_layer, json_layer) = match config.log_format {
        LogFormat::Pretty => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_line_number(true),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            ),
        ),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(pretty_layer)
        .with(json_layer)
        .with(filter)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed; keeping the existing one");
    }
}

/// Get the global tracer provider if initialized
pub fn tracer_provider() -> Option<Arc<TracerProvider>> {
    TRACER_PROVIDER.get().cloned()
}
