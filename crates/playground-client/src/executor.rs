//! Outbound request execution.

use crate::proxy::ApiRequest;
use indexmap::IndexMap;
use playground_openapi::HttpMethod;
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Status text reported when the exchange never completed.
pub const NETWORK_ERROR: &str = "Network Error";

/// One response shape for every outcome, including transport failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    /// 0 when no HTTP exchange took place
    pub status: u16,
    pub status_text: String,
    /// Lowercased names, last value wins
    pub headers: IndexMap<String, String>,
    pub data: Value,
    /// Whole milliseconds around the outbound call
    pub duration: u64,
}

impl NormalizedResponse {
    fn network_error(message: impl Into<String>, started: Instant) -> Self {
        Self {
            status: 0,
            status_text: NETWORK_ERROR.to_string(),
            headers: IndexMap::new(),
            data: json!({ "error": message.into() }),
            duration: elapsed_ms(started),
        }
    }

    pub fn is_network_error(&self) -> bool {
        self.status == 0
    }
}

/// Sends [`ApiRequest`]s and normalizes whatever comes back.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    client: reqwest::Client,
}

impl RequestExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Execute `request`. Never fails; transport errors come back as status 0.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: &ApiRequest) -> NormalizedResponse {
        let started = Instant::now();

        let mut builder = self.client.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed: {}", e);
                return NormalizedResponse::network_error(e.to_string(), started);
            }
        };

        let status = response.status();
        let mut headers = IndexMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        let is_json = headers
            .get("content-type")
            .is_some_and(|ct| ct.contains("application/json"));

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read response body: {}", e);
                return NormalizedResponse::network_error(e.to_string(), started);
            }
        };
        let duration = elapsed_ms(started);

        // Some upstreams label plain text as JSON
        let data = if is_json {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        } else {
            Value::String(text)
        };

        debug!("Response status: {} in {}ms", status, duration);

        NormalizedResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            data,
            duration,
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    (started.elapsed().as_secs_f64() * 1000.0).round() as u64
}
