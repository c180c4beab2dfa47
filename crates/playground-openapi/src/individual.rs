//! Individual Verification endpoints.
//!
//! These checks are served by the Human ID and Sign Protocol upstreams, which
//! publish no OpenAPI document, so they are declared here and merged into the
//! parsed endpoint list.

use crate::types::{HttpMethod, Parameter, ParsedEndpoint};

pub const INDIVIDUAL_VERIFICATIONS_TAG: &str = "Individual Verifications";

/// Action id used by the Human ID sybil-resistance checks unless overridden.
pub const DEFAULT_ACTION_ID: &str = "123456789";

pub const DEFAULT_NETWORK: &str = "optimism";

/// Prefix shared by every Individual Verification endpoint id.
pub const INDIVIDUAL_VERIFICATION_PREFIX: &str = "iv_";

pub fn is_individual_verification(endpoint_id: &str) -> bool {
    endpoint_id.starts_with(INDIVIDUAL_VERIFICATION_PREFIX)
}

/// The four statically declared endpoints, in display order.
pub fn individual_verification_endpoints() -> Vec<ParsedEndpoint> {
    vec![
        sybil_resistance(
            "iv_gov_id_verification",
            "gov-id",
            "Check government ID verification status",
            "Returns whether a user has completed government ID (KYC) verification and has a unique proof for the specified action.",
        ),
        sybil_resistance(
            "iv_phone_verification",
            "phone",
            "Check phone verification status",
            "Returns whether a user has completed phone verification and has a unique proof for the specified action.",
        ),
        sybil_resistance(
            "iv_biometrics_verification",
            "biometrics",
            "Check biometrics verification status",
            "Returns whether a user has completed biometric verification (face uniqueness and liveness check).",
        ),
        ParsedEndpoint {
            id: "iv_clean_hands".to_string(),
            method: HttpMethod::Get,
            path: "/api/scan/addresses/{address}/attestations".to_string(),
            summary: "Query Proof of Clean Hands attestations".to_string(),
            description: "Query Sign Protocol for Proof of Clean Hands attestations (sanctions/PEP screening).".to_string(),
            tag: INDIVIDUAL_VERIFICATIONS_TAG.to_string(),
            parameters: vec![
                Parameter::path("address")
                    .required()
                    .describe("User's blockchain address"),
            ],
            request_body: None,
            requires_auth: false,
        },
    ]
}

fn sybil_resistance(
    id: &str,
    credential: &str,
    summary: &str,
    description: &str,
) -> ParsedEndpoint {
    ParsedEndpoint {
        id: id.to_string(),
        method: HttpMethod::Get,
        path: format!("/sybil-resistance/{}/{{network}}", credential),
        summary: summary.to_string(),
        description: description.to_string(),
        tag: INDIVIDUAL_VERIFICATIONS_TAG.to_string(),
        parameters: vec![
            Parameter::path("network")
                .required()
                .describe("Network (optimism or base-sepolia)")
                .with_default(DEFAULT_NETWORK),
            Parameter::query("user")
                .required()
                .describe("User's blockchain address"),
            Parameter::query("action-id")
                .required()
                .describe("Action ID for sybil resistance (default: 123456789)")
                .with_default(DEFAULT_ACTION_ID),
        ],
        request_body: None,
        requires_auth: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterLocation;

    #[test]
    fn test_static_endpoints() {
        let endpoints = individual_verification_endpoints();
        assert_eq!(endpoints.len(), 4);
        assert!(endpoints.iter().all(|e| e.method == HttpMethod::Get));
        assert!(endpoints.iter().all(|e| !e.requires_auth));
        assert!(endpoints.iter().all(|e| is_individual_verification(&e.id)));
        assert!(endpoints.iter().all(|e| e.tag == INDIVIDUAL_VERIFICATIONS_TAG));
    }

    #[test]
    fn test_gov_id_parameters() {
        let gov_id = &individual_verification_endpoints()[0];
        assert_eq!(gov_id.path, "/sybil-resistance/gov-id/{network}");

        let network = &gov_id.parameters[0];
        assert_eq!(network.location, ParameterLocation::Path);
        assert_eq!(network.schema.default_as_string(), "optimism");

        let query: Vec<&str> = gov_id.query_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(query, vec!["user", "action-id"]);
        assert!(gov_id.query_parameters().all(|p| p.required));
    }

    #[test]
    fn test_clean_hands_has_only_address() {
        let clean_hands = &individual_verification_endpoints()[3];
        assert_eq!(clean_hands.parameters.len(), 1);
        assert!(clean_hands.declares(ParameterLocation::Path, "address"));
    }
}
