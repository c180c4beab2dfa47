use crate::error::ApiError;
use crate::proxy::ProxyCore;
use crate::upstream::{ReqwestUpstream, Upstream};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, RawQuery, State, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter, get},
};
use playground_client::ProxyRoute;
use playground_core::{PlaygroundConfig, UpstreamConfig};
use playground_openapi::{
    EndpointDetail, HttpMethod, NavigationSection, SpecLoader, UpstreamApi, catalog, registry,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub loader: Arc<SpecLoader>,
    pub upstreams: Arc<UpstreamConfig>,
    passport: Arc<ProxyCore>,
    holonym: Arc<ProxyCore>,
    sign: Arc<ProxyCore>,
}

impl AppState {
    pub fn new(
        config: &PlaygroundConfig,
        upstream: Arc<dyn Upstream>,
        loader: Arc<SpecLoader>,
    ) -> Self {
        let core = |route| {
            Arc::new(ProxyCore::from_config(
                route,
                &config.upstreams,
                &config.credentials,
            ))
        };

        Self {
            upstream,
            loader,
            upstreams: Arc::new(config.upstreams.clone()),
            passport: core(ProxyRoute::Passport),
            holonym: core(ProxyRoute::Holonym),
            sign: core(ProxyRoute::Sign),
        }
    }

    /// State backed by real HTTP clients.
    pub fn from_config(config: &PlaygroundConfig) -> Self {
        Self::new(
            config,
            Arc::new(ReqwestUpstream::new()),
            Arc::new(SpecLoader::from_config(&config.spec)),
        )
    }

    pub fn proxy(&self, route: ProxyRoute) -> &ProxyCore {
        match route {
            ProxyRoute::Passport => &self.passport,
            ProxyRoute::Holonym => &self.holonym,
            ProxyRoute::Sign => &self.sign,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Health check endpoints
        .route("/health", get(health_check))
        .route("/readiness", get(readiness_check))
        // Endpoint catalog
        .route("/api/endpoints", get(list_endpoints))
        .route("/api/endpoints/:slug", get(endpoint_detail));

    // Proxy routes, one method router each
    for route in ProxyRoute::ALL {
        router = router.route(route.path(), proxy_methods(route));
    }

    router
        // Middleware layers (applied in reverse order)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Method router accepting exactly the methods `route` allows; others get 405.
fn proxy_methods(route: ProxyRoute) -> MethodRouter<AppState> {
    let handler = move |State(state): State<AppState>,
                        method: Method,
                        RawQuery(query): RawQuery,
                        body: Result<Bytes, BytesRejection>| async move {
        let Ok(method) = method.as_str().parse::<HttpMethod>() else {
            return StatusCode::METHOD_NOT_ALLOWED.into_response();
        };

        // an unreadable body is forwarded as no body
        let body = body.ok();
        state
            .proxy(route)
            .handle(state.upstream.as_ref(), method, query.as_deref(), body.as_deref())
            .await
    };

    route
        .allowed_methods()
        .iter()
        .fold(MethodRouter::new(), |router, method| {
            router.on(method_filter(*method), handler.clone())
        })
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Patch => MethodFilter::PATCH,
    }
}

/// Health check endpoint - returns OK if the service is running
async fn health_check() -> impl IntoResponse {
    tracing::debug!("Health check requested");
    (StatusCode::OK, "OK")
}

/// Readiness check endpoint - ready once the OpenAPI document loads
async fn readiness_check(State(state): State<AppState>) -> Response {
    tracing::debug!("Readiness check requested");

    match state.loader.snapshot().await {
        Ok(_) => (StatusCode::OK, "READY").into_response(),
        Err(e) => {
            tracing::warn!("Spec unavailable: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY").into_response()
        }
    }
}

async fn list_endpoints(
    State(state): State<AppState>,
) -> Result<Json<Vec<NavigationSection>>, ApiError> {
    let snapshot = state.loader.snapshot().await?;
    let groups = catalog::sorted_groups(&snapshot.endpoints);
    Ok(Json(catalog::navigation(&groups)))
}

async fn endpoint_detail(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EndpointDetail>, ApiError> {
    let snapshot = state.loader.snapshot().await?;
    let endpoint = catalog::find_by_slug(&snapshot.endpoints, &slug)
        .ok_or_else(|| ApiError::NotFound(slug.clone()))?;

    // Passport endpoints use the document's own server, the others their upstream
    let base_url = match registry::upstream_for(&endpoint.id) {
        UpstreamApi::Passport => snapshot.base_url.as_str(),
        other => other.base_url(&state.upstreams),
    };

    Ok(Json(catalog::describe(endpoint, base_url)))
}
