//! Remote spec loading with periodic revalidation.

use crate::error::{OpenApiError, Result};
use crate::parser::OpenApiParser;
use crate::types::ParsedEndpoint;
use chrono::{DateTime, Utc};
use openapiv3::OpenAPI;
use playground_core::SpecConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// One fetched document and everything derived from it.
///
/// Immutable; readers share it through `Arc` until the next revalidation.
#[derive(Debug, Clone)]
pub struct SpecSnapshot {
    pub spec: OpenAPI,
    /// Remote endpoints followed by the Individual Verification endpoints
    pub endpoints: Vec<ParsedEndpoint>,
    pub base_url: String,
    pub fetched_at: DateTime<Utc>,
}

impl SpecSnapshot {
    pub fn from_spec(spec: OpenAPI) -> Result<Self> {
        let parser = OpenApiParser::new(spec);
        let endpoints = parser.normalize()?;
        let base_url = parser.base_url();

        Ok(Self {
            spec: parser.into_spec(),
            endpoints,
            base_url,
            fetched_at: Utc::now(),
        })
    }

    /// Parse a JSON or YAML document into a snapshot.
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_spec(OpenApiParser::from_str(content)?.into_spec())
    }

    pub fn endpoint(&self, id: &str) -> Result<&ParsedEndpoint> {
        self.endpoints
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| OpenApiError::EndpointNotFound(id.to_string()))
    }
}

struct CachedSnapshot {
    snapshot: Arc<SpecSnapshot>,
    loaded: Instant,
}

/// Fetches the OpenAPI document and caches the parsed snapshot.
pub struct SpecLoader {
    url: String,
    revalidate_after: Duration,
    client: reqwest::Client,
    cache: RwLock<Option<CachedSnapshot>>,
}

impl SpecLoader {
    pub fn new(url: impl Into<String>, revalidate_after: Duration) -> Self {
        Self {
            url: url.into(),
            revalidate_after,
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    pub fn from_config(config: &SpecConfig) -> Self {
        Self::new(config.url.clone(), config.revalidate_after())
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and deserialize the document. A non-success status is an error.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<OpenAPI> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(OpenApiError::FetchFailed {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content = response.text().await?;
        Ok(OpenApiParser::from_str(&content)?.into_spec())
    }

    /// The current snapshot, refetched once it is older than the revalidation window.
    ///
    /// A failed refetch is returned as an error; there is no stale fallback.
    pub async fn snapshot(&self) -> Result<Arc<SpecSnapshot>> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.loaded.elapsed() < self.revalidate_after {
                return Ok(cached.snapshot.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(cached) = cache.as_ref() {
            if cached.loaded.elapsed() < self.revalidate_after {
                return Ok(cached.snapshot.clone());
            }
        }

        debug!("Revalidating OpenAPI spec from {}", self.url);
        let snapshot = Arc::new(SpecSnapshot::from_spec(self.fetch().await?)?);
        info!(
            "Loaded OpenAPI spec with {} endpoints",
            snapshot.endpoints.len()
        );

        *cache = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            loaded: Instant::now(),
        });

        Ok(snapshot)
    }

    /// Seed the cache with an already parsed snapshot.
    pub async fn prime(&self, snapshot: SpecSnapshot) -> Arc<SpecSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.cache.write().await = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            loaded: Instant::now(),
        });
        snapshot
    }

    /// Drop the cached snapshot so the next read refetches.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
