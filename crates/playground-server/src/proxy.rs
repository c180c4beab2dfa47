//! The shared proxy core behind `/api/proxy`, `/api/proxy/holonym` and
//! `/api/proxy/sign`.

use crate::error::ProxyError;
use crate::upstream::{Upstream, UpstreamRequest};
use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use playground_client::{ProxyRoute, ProxyTarget};
use playground_core::{CredentialsConfig, UpstreamConfig};
use playground_openapi::HttpMethod;
use playground_telemetry::{proxy_span, record_response_status, record_upstream_call};
use serde_json::Value;
use std::time::Instant;
use tracing::{Instrument, Span, debug, error};

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const PROXY_STATUS_HEADER: &str = "X-Proxy-Status";
pub const PROXY_DURATION_HEADER: &str = "X-Proxy-Duration";

/// Upstream header copied into `X-Proxy-Duration`.
const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// One proxy route: where it forwards to and which credential it attaches.
#[derive(Debug, Clone)]
pub struct ProxyCore {
    route: ProxyRoute,
    upstream_base: String,
    /// Only consulted when the route is credentialed
    credentials: CredentialsConfig,
}

impl ProxyCore {
    pub fn new(
        route: ProxyRoute,
        upstream_base: impl Into<String>,
        credentials: CredentialsConfig,
    ) -> Self {
        Self {
            route,
            upstream_base: upstream_base.into(),
            credentials,
        }
    }

    /// The core for `route` as configured for this deployment.
    pub fn from_config(
        route: ProxyRoute,
        upstreams: &UpstreamConfig,
        credentials: &CredentialsConfig,
    ) -> Self {
        let credentials = if route.is_credentialed() {
            credentials.clone()
        } else {
            CredentialsConfig::default()
        };
        Self::new(route, route.upstream().base_url(upstreams), credentials)
    }

    pub fn route(&self) -> ProxyRoute {
        self.route
    }

    pub fn upstream_base(&self) -> &str {
        &self.upstream_base
    }

    /// Forward one inbound request and render the response.
    ///
    /// The whole exchange runs inside one `proxy_call` span.
    pub async fn handle(
        &self,
        upstream: &dyn Upstream,
        method: HttpMethod,
        raw_query: Option<&str>,
        body: Option<&[u8]>,
    ) -> Response {
        let span = proxy_span(self.route.path(), method.as_str(), self.route.is_credentialed());

        async {
            let response = match self.forward(upstream, method, raw_query, body).await {
                Ok(response) => response,
                Err(e) => {
                    if !matches!(e, ProxyError::MissingPath | ProxyError::InvalidPath) {
                        error!("{} proxy error: {}", self.route, e);
                    }
                    e.into_response()
                }
            };
            record_response_status(&Span::current(), response.status().as_u16());
            response
        }
        .instrument(span)
        .await
    }

    async fn forward(
        &self,
        upstream: &dyn Upstream,
        method: HttpMethod,
        raw_query: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Response, ProxyError> {
        let target = ProxyTarget::from_query(raw_query.unwrap_or_default())
            .ok_or(ProxyError::MissingPath)?;
        if !target.is_rooted() {
            return Err(ProxyError::InvalidPath);
        }

        let mut headers = IndexMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]);
        if self.route.is_credentialed() {
            let key = self.credentials.require_api_key()?;
            headers.insert(API_KEY_HEADER.to_string(), key.to_string());
        }

        let url = target.upstream_url(&self.upstream_base);

        // GET carries no body; an empty body counts as none
        let body = match method {
            HttpMethod::Get => None,
            _ => body
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        };

        debug!("Forwarding {} {} via {}", method, url, self.route);

        let started = Instant::now();
        let result = upstream
            .send(UpstreamRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await;

        record_upstream_call(&Span::current(), &url, started.elapsed().as_millis() as u64);

        let response = result?;
        let data: Value = serde_json::from_str(&response.body)
            .map_err(|e| ProxyError::InvalidUpstreamBody(e.to_string()))?;
        let status = StatusCode::from_u16(response.status)
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let mut rendered = (status, Json(data)).into_response();
        let out = rendered.headers_mut();
        out.insert(PROXY_STATUS_HEADER, HeaderValue::from(response.status));
        if self.route.reports_duration() {
            let duration = response
                .header(RESPONSE_TIME_HEADER)
                .and_then(|v| HeaderValue::from_str(v).ok())
                .unwrap_or_else(|| HeaderValue::from_static("0"));
            out.insert(PROXY_DURATION_HEADER, duration);
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamResponse;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    /// Records calls and replies with a fixed response.
    struct Recording {
        calls: Mutex<Vec<UpstreamRequest>>,
        reply: Result<UpstreamResponse, String>,
    }

    impl Recording {
        fn replying(status: u16, body: &str, headers: &[(&str, &str)]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Ok(UpstreamResponse {
                    status,
                    headers: headers
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    body: body.to_string(),
                }),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Err(message.to_string()),
            }
        }

        fn calls(&self) -> Vec<UpstreamRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Upstream for Recording {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError> {
            self.calls.lock().unwrap().push(request);
            self.reply.clone().map_err(ProxyError::Upstream)
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn passport(api_key: Option<&str>) -> ProxyCore {
        let credentials = CredentialsConfig {
            api_key: api_key.map(str::to_string),
            ..CredentialsConfig::default()
        };
        ProxyCore::new(ProxyRoute::Passport, "https://api.passport.xyz", credentials)
    }

    #[tokio::test]
    async fn test_forwards_with_credential() {
        let upstream = Recording::replying(200, r#"{"score":"1"}"#, &[("x-response-time", "12ms")]);
        let response = passport(Some("secret"))
            .handle(
                &upstream,
                HttpMethod::Get,
                Some("path=%2Fv2%2Fstamps%2F1%2Fscore%2F0xabc&limit=5"),
                None,
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[PROXY_STATUS_HEADER], "200");
        assert_eq!(response.headers()[PROXY_DURATION_HEADER], "12ms");

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://api.passport.xyz/v2/stamps/1/score/0xabc?limit=5");
        assert_eq!(calls[0].headers[API_KEY_HEADER], "secret");
        assert_eq!(calls[0].headers["Content-Type"], "application/json");
        assert!(calls[0].body.is_none());

        assert_eq!(json_body(response).await, serde_json::json!({"score": "1"}));
    }

    #[tokio::test]
    async fn test_missing_path_is_400_before_credential_check() {
        let upstream = Recording::replying(200, "{}", &[]);
        let response = passport(None)
            .handle(&upstream, HttpMethod::Post, Some("limit=5"), None)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"error": "Missing path parameter"})
        );
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_closed() {
        for key in [None, Some("")] {
            let upstream = Recording::replying(200, "{}", &[]);
            let response = passport(key)
                .handle(&upstream, HttpMethod::Get, Some("path=%2Fv2%2Fx"), None)
                .await;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                json_body(response).await,
                serde_json::json!({"error": "API key not configured on server"})
            );
            assert!(upstream.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_uncredentialed_route_sends_no_key() {
        let upstream = Recording::replying(200, r#"{"result":true}"#, &[]);
        let core = ProxyCore::new(ProxyRoute::Holonym, "https://api.holonym.io", CredentialsConfig::default());
        let response = core
            .handle(
                &upstream,
                HttpMethod::Post,
                Some("path=%2Fsybil-resistance%2Fgov-id%2Foptimism&user=0xABC"),
                Some(br#"{"a":1}"#),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[PROXY_DURATION_HEADER], "0");

        let calls = upstream.calls();
        assert!(!calls[0].headers.contains_key(API_KEY_HEADER));
        assert_eq!(calls[0].body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(
            calls[0].url,
            "https://api.holonym.io/sybil-resistance/gov-id/optimism?user=0xABC"
        );
    }

    #[tokio::test]
    async fn test_sign_route_has_no_duration_header() {
        let upstream = Recording::replying(404, r#"{"message":"none"}"#, &[("x-response-time", "3")]);
        let core = ProxyCore::new(ProxyRoute::Sign, "https://mainnet-rpc.sign.global", CredentialsConfig::default());
        let response = core
            .handle(&upstream, HttpMethod::Get, Some("path=%2Fapi%2Fscan"), None)
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[PROXY_STATUS_HEADER], "404");
        assert!(response.headers().get(PROXY_DURATION_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_empty_body_is_absent() {
        let upstream = Recording::replying(200, "{}", &[]);
        passport(Some("k"))
            .handle(&upstream, HttpMethod::Put, Some("path=%2Fx"), Some(b""))
            .await;
        assert!(upstream.calls()[0].body.is_none());
    }

    #[tokio::test]
    async fn test_non_json_upstream_is_500() {
        let upstream = Recording::replying(200, "<html>oops</html>", &[]);
        let response = passport(Some("k"))
            .handle(&upstream, HttpMethod::Get, Some("path=%2Fx"), None)
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_transport_failure_is_500() {
        let upstream = Recording::failing("connection refused");
        let response = passport(Some("k"))
            .handle(&upstream, HttpMethod::Delete, Some("path=%2Fx"), None)
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"error": "connection refused"})
        );
    }

    #[tokio::test]
    async fn test_unrooted_path_is_400_without_outbound_call() {
        for query in [
            "path=%40evil.example%2Fsteal",
            "path=.evil.example%2Fsteal",
            "path=%2F%2Fevil.example%2Fsteal",
            "path=%2F%5Cevil.example%2Fsteal",
            "path=v2%2Fstamps",
        ] {
            let upstream = Recording::replying(200, "{}", &[]);
            let response = passport(Some("secret"))
                .handle(&upstream, HttpMethod::Get, Some(query), None)
                .await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", query);
            assert_eq!(
                json_body(response).await,
                serde_json::json!({"error": "Invalid path parameter"})
            );
            assert!(upstream.calls().is_empty(), "{} reached the upstream", query);
        }
    }

    /// Names the innermost span around every event.
    struct EventScopes(Arc<Mutex<Vec<Option<String>>>>);

    impl<S> Layer<S> for EventScopes
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, _event: &Event<'_>, ctx: Context<'_, S>) {
            let scope = ctx.lookup_current().map(|span| span.name().to_string());
            self.0.lock().unwrap().push(scope);
        }
    }

    #[tokio::test]
    async fn test_call_logs_nest_under_proxy_span() {
        let scopes = Arc::new(Mutex::new(Vec::new()));
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(EventScopes(scopes.clone())),
        );

        let ok = Recording::replying(200, "{}", &[]);
        passport(Some("k"))
            .handle(&ok, HttpMethod::Get, Some("path=%2Fv2%2Fx"), None)
            .await;
        let failing = Recording::failing("connection refused");
        passport(Some("k"))
            .handle(&failing, HttpMethod::Get, Some("path=%2Fv2%2Fx"), None)
            .await;

        let scopes = scopes.lock().unwrap();
        // the forwarding debug line for both calls and the error line
        assert!(scopes.len() >= 3);
        assert!(scopes.iter().all(|scope| scope.as_deref() == Some("proxy_call")));
    }

    #[test]
    fn test_from_config_only_passport_keeps_key() {
        let config = playground_core::PlaygroundConfig::test_defaults();
        let passport =
            ProxyCore::from_config(ProxyRoute::Passport, &config.upstreams, &config.credentials);
        let sign = ProxyCore::from_config(ProxyRoute::Sign, &config.upstreams, &config.credentials);

        assert_eq!(passport.credentials.api_key.as_deref(), Some("test-api-key"));
        assert!(sign.credentials.api_key.is_none());
        assert_eq!(sign.upstream_base(), config.upstreams.sign);
    }
}
