//! Proxy routing and request construction.
//!
//! The browser never talks to an upstream API directly. Every request is
//! re-addressed to one of three same-origin proxy routes, with the real
//! upstream path carried in the `path` query parameter.

use crate::error::{ClientError, Result};
use indexmap::IndexMap;
use playground_core::UpstreamConfig;
use playground_openapi::{HttpMethod, UpstreamApi, registry};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::{Url, form_urlencoded};

/// Query parameter holding the upstream path on a proxy URL.
pub const PATH_PARAM: &str = "path";

/// The local proxy routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyRoute {
    /// Passport API, the server attaches its API key
    Passport,
    /// Human ID, no credential
    Holonym,
    /// Sign Protocol, no credential, GET only
    Sign,
}

impl ProxyRoute {
    pub const ALL: [ProxyRoute; 3] = [ProxyRoute::Passport, ProxyRoute::Holonym, ProxyRoute::Sign];

    pub fn path(&self) -> &'static str {
        match self {
            ProxyRoute::Passport => "/api/proxy",
            ProxyRoute::Holonym => "/api/proxy/holonym",
            ProxyRoute::Sign => "/api/proxy/sign",
        }
    }

    pub fn for_upstream(upstream: UpstreamApi) -> Self {
        match upstream {
            UpstreamApi::Passport => ProxyRoute::Passport,
            UpstreamApi::HumanId => ProxyRoute::Holonym,
            UpstreamApi::SignProtocol => ProxyRoute::Sign,
        }
    }

    /// Route for an endpoint id, taken from the metadata registry.
    pub fn for_endpoint(endpoint_id: &str) -> Self {
        Self::for_upstream(registry::upstream_for(endpoint_id))
    }

    pub fn upstream(&self) -> UpstreamApi {
        match self {
            ProxyRoute::Passport => UpstreamApi::Passport,
            ProxyRoute::Holonym => UpstreamApi::HumanId,
            ProxyRoute::Sign => UpstreamApi::SignProtocol,
        }
    }

    pub fn is_credentialed(&self) -> bool {
        self.upstream().requires_credential()
    }

    /// Methods the route accepts; anything else is rejected with 405.
    pub fn allowed_methods(&self) -> &'static [HttpMethod] {
        match self {
            ProxyRoute::Passport => &[
                HttpMethod::Get,
                HttpMethod::Post,
                HttpMethod::Put,
                HttpMethod::Delete,
            ],
            ProxyRoute::Holonym => &[HttpMethod::Get, HttpMethod::Post],
            ProxyRoute::Sign => &[HttpMethod::Get],
        }
    }

    /// Whether responses carry `X-Proxy-Duration`.
    pub fn reports_duration(&self) -> bool {
        !matches!(self, ProxyRoute::Sign)
    }
}

impl fmt::Display for ProxyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A fully prepared HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    /// JSON text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// An [`ApiRequest`] addressed to a local proxy route.
pub type ProxiedRequest = ApiRequest;

/// The upstream half of a proxy URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub path: String,
    /// Passthrough query pairs, decoded, in order
    pub query: Vec<(String, String)>,
}

impl ProxyTarget {
    /// Split a raw proxy query string into the upstream path and the rest.
    ///
    /// Returns `None` when `path` is absent or empty.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut path = None;
        let mut rest = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == PATH_PARAM {
                if path.is_none() {
                    path = Some(value.into_owned());
                }
            } else {
                rest.push((key.into_owned(), value.into_owned()));
            }
        }

        path.filter(|p| !p.is_empty())
            .map(|path| ProxyTarget { path, query: rest })
    }

    /// Whether `path` starts with exactly one `/`.
    ///
    /// Only a rooted path keeps `{base}{path}` on the base URL's host; `@evil`,
    /// `.evil` or `//evil` would move the request to another authority.
    pub fn is_rooted(&self) -> bool {
        self.path.starts_with('/') && !self.path.starts_with("//") && !self.path.starts_with("/\\")
    }

    /// `{base}{path}{?query}` with the passthrough query re-encoded.
    pub fn upstream_url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url, self.path);

        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        url
    }
}

/// Builds proxied requests for a given browser origin.
#[derive(Debug, Clone)]
pub struct ProxyRequestBuilder {
    origin: Url,
    holonym: Option<(String, Option<u16>)>,
    sign: Option<(String, Option<u16>)>,
}

impl ProxyRequestBuilder {
    pub fn new(origin: &str, upstreams: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            origin: Url::parse(origin)?,
            holonym: authority(&upstreams.holonym),
            sign: authority(&upstreams.sign),
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Route for an arbitrary URL, by exact host and port.
    ///
    /// Anything that is neither the Human ID nor the Sign Protocol host goes
    /// to the credentialed Passport route.
    pub fn route_for_url(&self, target: &Url) -> ProxyRoute {
        let host = target.host_str().map(|h| (h.to_string(), target.port_or_known_default()));

        match host {
            Some(h) if self.holonym.as_ref() == Some(&h) => ProxyRoute::Holonym,
            Some(h) if self.sign.as_ref() == Some(&h) => ProxyRoute::Sign,
            _ => ProxyRoute::Passport,
        }
    }

    /// Re-address `target_url` to the proxy chosen from its host.
    pub fn build_proxied_request(
        &self,
        method: HttpMethod,
        target_url: &str,
        body: Option<&Value>,
    ) -> Result<ProxiedRequest> {
        let target = Url::parse(target_url)?;
        let route = self.route_for_url(&target);
        self.build(route, method, &target, body)
    }

    /// Re-address `target_url` to the proxy registered for `endpoint_id`.
    pub fn build_for_endpoint(
        &self,
        endpoint_id: &str,
        method: HttpMethod,
        target_url: &str,
        body: Option<&Value>,
    ) -> Result<ProxiedRequest> {
        let target = Url::parse(target_url)?;
        self.build(ProxyRoute::for_endpoint(endpoint_id), method, &target, body)
    }

    fn build(
        &self,
        route: ProxyRoute,
        method: HttpMethod,
        target: &Url,
        body: Option<&Value>,
    ) -> Result<ProxiedRequest> {
        let mut proxy_url = self.origin.join(route.path())?;

        // Repeated keys collapse onto their first position with the last value
        let mut pairs: IndexMap<String, String> = IndexMap::new();
        pairs.insert(PATH_PARAM.to_string(), target.path().to_string());
        for (key, value) in target.query_pairs() {
            pairs.insert(key.into_owned(), value.into_owned());
        }
        proxy_url.query_pairs_mut().clear().extend_pairs(&pairs);

        debug!("Proxying {} {} via {}", method, target, route);

        Ok(ApiRequest {
            method,
            url: proxy_url.to_string(),
            headers: json_headers(),
            body: body.map(serde_json::to_string).transpose()?,
        })
    }
}

/// The request as it would be sent straight to the upstream.
pub fn build_direct_request(
    method: HttpMethod,
    url: &str,
    api_key: &str,
    body: Option<&Value>,
) -> Result<ApiRequest> {
    let mut headers = json_headers();
    if !api_key.is_empty() {
        headers.insert("X-API-Key".to_string(), api_key.to_string());
    }

    Ok(ApiRequest {
        method,
        url: url.to_string(),
        headers,
        body: body.map(serde_json::to_string).transpose()?,
    })
}

/// Recover the upstream path and passthrough query from a proxy URL.
pub fn decode_proxied_target(proxy_url: &str) -> Result<ProxyTarget> {
    let url = Url::parse(proxy_url)?;
    ProxyTarget::from_query(url.query().unwrap_or_default()).ok_or(ClientError::MissingProxyPath)
}

fn json_headers() -> IndexMap<String, String> {
    IndexMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

fn authority(base_url: &str) -> Option<(String, Option<u16>)> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?.to_string();
    Some((host, url.port_or_known_default()))
}
