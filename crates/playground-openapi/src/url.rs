//! Request URL construction.
//!
//! Unfilled path placeholders are left in the output on purpose so the URL
//! preview shows what is still missing. Whether a request may be sent is a
//! separate question answered by [`can_send_request`].

use crate::types::{ParamValues, ParsedEndpoint};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URI component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Resolve `path_template` against `base_url` and the current parameter values.
///
/// - `{name}` is replaced by the encoded value when it is non-empty, otherwise
///   left untouched.
/// - Query pairs with empty values are dropped; the rest keep input order.
pub fn build_url(
    base_url: &str,
    path_template: &str,
    path_params: &ParamValues,
    query_params: &ParamValues,
) -> String {
    let mut url = String::with_capacity(base_url.len() + path_template.len());
    url.push_str(base_url);
    url.push_str(&resolve_path(path_template, path_params));

    let query = query_params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&");

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    url
}

fn resolve_path(template: &str, path_params: &ParamValues) -> String {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };

        resolved.push_str(&rest[..open]);
        let name = &rest[open + 1..close];
        match path_params.get(name) {
            Some(value) if !value.is_empty() => resolved.push_str(&encode_component(value)),
            _ => resolved.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }

    resolved.push_str(rest);
    resolved
}

/// True iff every required path and query parameter has a non-empty value.
pub fn can_send_request(
    endpoint: &ParsedEndpoint,
    path_params: &ParamValues,
    query_params: &ParamValues,
) -> bool {
    let filled = |values: &ParamValues, name: &str| values.get(name).is_some_and(|v| !v.is_empty());

    endpoint
        .path_parameters()
        .filter(|p| p.required)
        .all(|p| filled(path_params, &p.name))
        && endpoint
            .query_parameters()
            .filter(|p| p.required)
            .all(|p| filled(query_params, &p.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::individual_verification_endpoints;

    fn values(pairs: &[(&str, &str)]) -> ParamValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_path_value_keeps_placeholder() {
        let url = build_url(
            "https://api.passport.xyz",
            "/v2/stamps/{scorer_id}/score/{address}",
            &values(&[("scorer_id", "335"), ("address", "")]),
            &ParamValues::new(),
        );
        assert_eq!(url, "https://api.passport.xyz/v2/stamps/335/score/{address}");
    }

    #[test]
    fn test_absent_path_value_keeps_placeholder() {
        let url = build_url("", "/a/{missing}/b", &ParamValues::new(), &ParamValues::new());
        assert_eq!(url, "/a/{missing}/b");
    }

    #[test]
    fn test_path_value_is_encoded() {
        let url = build_url(
            "",
            "/items/{name}",
            &values(&[("name", "a b/c?d&e")]),
            &ParamValues::new(),
        );
        assert_eq!(url, "/items/a%20b%2Fc%3Fd%26e");
    }

    #[test]
    fn test_value_containing_braces_is_substituted_once() {
        let url = build_url("", "/x/{id}/y", &values(&[("id", "{id}")]), &ParamValues::new());
        assert_eq!(url, "/x/%7Bid%7D/y");
    }

    #[test]
    fn test_query_keeps_order_and_skips_empty() {
        let url = build_url(
            "https://api.holonym.io",
            "/sybil-resistance/gov-id/{network}",
            &values(&[("network", "optimism")]),
            &values(&[("user", "0xABC"), ("skip", ""), ("action-id", "123456789")]),
        );
        assert_eq!(
            url,
            "https://api.holonym.io/sybil-resistance/gov-id/optimism?user=0xABC&action-id=123456789"
        );
    }

    #[test]
    fn test_query_key_and_value_are_encoded() {
        let url = build_url("", "/q", &ParamValues::new(), &values(&[("a key", "x=y&z")]));
        assert_eq!(url, "/q?a%20key=x%3Dy%26z");
    }

    #[test]
    fn test_no_question_mark_without_query() {
        let url = build_url("", "/q", &ParamValues::new(), &values(&[("a", "")]));
        assert_eq!(url, "/q");
    }

    #[test]
    fn test_build_url_is_idempotent() {
        let path = values(&[("network", "base-sepolia")]);
        let query = values(&[("user", "0x1"), ("action-id", "42")]);
        let first = build_url("https://h", "/p/{network}", &path, &query);
        let second = build_url("https://h", "/p/{network}", &path, &query);
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_component_matches_uri_component_rules() {
        assert_eq!(encode_component("AZaz09-_.!~*'()"), "AZaz09-_.!~*'()");
        assert_eq!(encode_component("é"), "%C3%A9");
        assert_eq!(encode_component("+"), "%2B");
    }

    #[test]
    fn test_can_send_request() {
        let gov_id = &individual_verification_endpoints()[0];

        assert!(!can_send_request(gov_id, &ParamValues::new(), &ParamValues::new()));

        let path = values(&[("network", "optimism")]);
        let partial = values(&[("user", "0xABC"), ("action-id", "")]);
        assert!(!can_send_request(gov_id, &path, &partial));

        let full = values(&[("user", "0xABC"), ("action-id", "1")]);
        assert!(can_send_request(gov_id, &path, &full));
    }
}
