//! Grouped and sorted projections of the endpoint list.
//!
//! Every function here builds a fresh view; the parsed endpoint list itself
//! is never reordered.

use crate::registry::{self, EndpointMetadata, UpstreamApi};
use crate::types::{HttpMethod, ParsedEndpoint};
use indexmap::IndexMap;
use serde::Serialize;

/// Endpoints sharing one tag, sorted by registry order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointGroup {
    pub tag: String,
    pub display_name: String,
    pub endpoints: Vec<ParsedEndpoint>,
}

/// One navigation section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSection {
    pub tag: String,
    pub display_name: String,
    pub endpoints: Vec<NavigationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    pub id: String,
    pub slug: String,
    pub display_name: String,
    pub method: HttpMethod,
}

/// An endpoint decorated with everything its reference panel shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDetail {
    #[serde(flatten)]
    pub endpoint: ParsedEndpoint,
    pub display_name: String,
    pub slug: String,
    /// Registry description when present, the spec's own text otherwise
    pub long_description: String,
    pub docs_url: Option<&'static str>,
    pub upstream: UpstreamApi,
    pub base_url: String,
    pub sample_response: String,
}

/// Group endpoints by tag, keeping first-seen tag order and source order.
pub fn group_by_tag(endpoints: &[ParsedEndpoint]) -> IndexMap<String, Vec<ParsedEndpoint>> {
    let mut grouped: IndexMap<String, Vec<ParsedEndpoint>> = IndexMap::new();

    for endpoint in endpoints {
        grouped
            .entry(endpoint.tag.clone())
            .or_default()
            .push(endpoint.clone());
    }

    grouped
}

/// Groups sorted by tag order, endpoints sorted by registry order.
///
/// Both sorts are stable, so ties keep their source order.
pub fn sorted_groups(endpoints: &[ParsedEndpoint]) -> Vec<EndpointGroup> {
    let mut groups: Vec<EndpointGroup> = group_by_tag(endpoints)
        .into_iter()
        .map(|(tag, mut endpoints)| {
            endpoints.sort_by_key(|e| registry::order(&e.id));
            EndpointGroup {
                display_name: registry::tag_display_name(&tag).to_string(),
                tag,
                endpoints,
            }
        })
        .collect();

    groups.sort_by_key(|g| registry::tag_order(&g.tag));
    groups
}

pub fn navigation(groups: &[EndpointGroup]) -> Vec<NavigationSection> {
    groups
        .iter()
        .map(|group| NavigationSection {
            tag: group.tag.clone(),
            display_name: group.display_name.clone(),
            endpoints: group
                .endpoints
                .iter()
                .map(|endpoint| {
                    let meta = EndpointMetadata::for_id(&endpoint.id);
                    NavigationEntry {
                        id: endpoint.id.clone(),
                        slug: meta.slug,
                        display_name: meta.display_name,
                        method: endpoint.method,
                    }
                })
                .collect(),
        })
        .collect()
}

pub fn find_by_slug<'a>(endpoints: &'a [ParsedEndpoint], slug: &str) -> Option<&'a ParsedEndpoint> {
    endpoints.iter().find(|e| registry::slug(&e.id) == slug)
}

pub fn find_by_id<'a>(endpoints: &'a [ParsedEndpoint], id: &str) -> Option<&'a ParsedEndpoint> {
    endpoints.iter().find(|e| e.id == id)
}

/// Decorate an endpoint with registry metadata.
///
/// `base_url` is the resolved base of the endpoint's upstream.
pub fn describe(endpoint: &ParsedEndpoint, base_url: &str) -> EndpointDetail {
    let meta = EndpointMetadata::for_id(&endpoint.id);

    EndpointDetail {
        display_name: meta.display_name,
        slug: meta.slug,
        long_description: meta
            .description
            .map(str::to_string)
            .unwrap_or_else(|| endpoint.description.clone()),
        docs_url: meta.docs_url,
        upstream: meta.upstream,
        base_url: base_url.to_string(),
        sample_response: registry::sample_response(&endpoint.id),
        endpoint: endpoint.clone(),
    }
}
