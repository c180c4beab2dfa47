//! Endpoint metadata registry.
//!
//! Static display configuration keyed by endpoint id: display names, anchor
//! slugs, ordering, long-form descriptions, documentation links, and which
//! upstream API serves the endpoint. Ids outside [`KnownEndpoint`] fall back
//! to derived defaults.

use crate::individual::{INDIVIDUAL_VERIFICATIONS_TAG, is_individual_verification};
use playground_core::UpstreamConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Order given to anything the registry does not know.
pub const DEFAULT_ORDER: u32 = 999;

/// The upstream API family that owns an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamApi {
    /// Scoring, stamps and models (credentialed)
    Passport,
    /// Individual Verification checks
    HumanId,
    /// Proof of Clean Hands attestations
    SignProtocol,
}

impl UpstreamApi {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            UpstreamApi::Passport => "https://api.passport.xyz",
            UpstreamApi::HumanId => "https://api.holonym.io",
            UpstreamApi::SignProtocol => "https://mainnet-rpc.sign.global",
        }
    }

    /// Base URL for this upstream as configured for the deployment.
    pub fn base_url<'a>(&self, upstreams: &'a UpstreamConfig) -> &'a str {
        match self {
            UpstreamApi::Passport => &upstreams.passport,
            UpstreamApi::HumanId => &upstreams.holonym,
            UpstreamApi::SignProtocol => &upstreams.sign,
        }
    }

    /// Whether the server must attach its API key when proxying.
    pub fn requires_credential(&self) -> bool {
        matches!(self, UpstreamApi::Passport)
    }
}

/// Endpoint ids with registry entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownEndpoint {
    StampsScore,
    ScoreHistory,
    VerifiedStamps,
    AllStamps,
    ModelScore,
    GovIdVerification,
    PhoneVerification,
    BiometricsVerification,
    CleanHands,
}

impl KnownEndpoint {
    pub const ALL: [KnownEndpoint; 9] = [
        KnownEndpoint::StampsScore,
        KnownEndpoint::ScoreHistory,
        KnownEndpoint::VerifiedStamps,
        KnownEndpoint::AllStamps,
        KnownEndpoint::ModelScore,
        KnownEndpoint::GovIdVerification,
        KnownEndpoint::PhoneVerification,
        KnownEndpoint::BiometricsVerification,
        KnownEndpoint::CleanHands,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            KnownEndpoint::StampsScore => "v2_api_api_stamps_a_submit_passport",
            KnownEndpoint::ScoreHistory => "v2_api_api_stamps_get_score_history",
            KnownEndpoint::VerifiedStamps => "v2_api_api_stamps_get_passport_stamps",
            KnownEndpoint::AllStamps => "v2_api_api_stamps_stamp_display",
            KnownEndpoint::ModelScore => "v2_api_api_models_get_analysis",
            KnownEndpoint::GovIdVerification => "iv_gov_id_verification",
            KnownEndpoint::PhoneVerification => "iv_phone_verification",
            KnownEndpoint::BiometricsVerification => "iv_biometrics_verification",
            KnownEndpoint::CleanHands => "iv_clean_hands",
        }
    }

    pub fn upstream(&self) -> UpstreamApi {
        match self {
            KnownEndpoint::CleanHands => UpstreamApi::SignProtocol,
            KnownEndpoint::GovIdVerification
            | KnownEndpoint::PhoneVerification
            | KnownEndpoint::BiometricsVerification => UpstreamApi::HumanId,
            _ => UpstreamApi::Passport,
        }
    }

    /// Credential type understood by the Human ID SDK, for IV endpoints only.
    pub fn sdk_credential_type(&self) -> Option<&'static str> {
        match self {
            KnownEndpoint::GovIdVerification => Some("kyc"),
            KnownEndpoint::PhoneVerification => Some("phone"),
            KnownEndpoint::BiometricsVerification => Some("biometrics"),
            KnownEndpoint::CleanHands => Some("clean-hands"),
            _ => None,
        }
    }

    pub fn metadata(&self) -> EndpointMetadata {
        let (display_name, slug, order, description, docs_url) = match self {
            KnownEndpoint::StampsScore => (
                "GET Stamps Score",
                "stamps-score",
                1,
                "This is the primary endpoint that partners using the Stamps product will use.<br /><br />This endpoint returns the latest score and Stamp data for a single address.",
                "https://docs.passport.xyz/building-with-passport/stamps/passport-api/api-reference#retrieve-latest-score-for-a-single-address",
            ),
            KnownEndpoint::ScoreHistory => (
                "GET Score History",
                "score-history",
                2,
                "This endpoint will return the historical score and Stamp data for a single address at a specified time.<br /><br />**Note:** To access this endpoint, you must submit your use case and be approved by the Passport team. To do so, please fill out the following form, making sure to provide a detailed description of your use case. The Passport team typically reviews and responds to form responses within 48 hours. [Request access](https://forms.gle/4GyicBfhtHW29eEu8)",
                "https://docs.passport.xyz/building-with-passport/stamps/passport-api/api-reference#retrieve-historical-score-for-a-single-address",
            ),
            KnownEndpoint::VerifiedStamps => (
                "GET Verified Stamps",
                "verified-stamps",
                3,
                "Use this endpoint to request all Stamps that have been verified by the specified Ethereum address.<br /><br />If you would like to retrieve the metadata for all available Stamps, please use the [GET All Stamps](#all-stamps) endpoint.",
                "https://docs.passport.xyz/building-with-passport/stamps/passport-api/api-reference#retrieve-stamps-verified-by-a-single-address",
            ),
            KnownEndpoint::AllStamps => (
                "GET All Stamps",
                "all-stamps",
                4,
                "Use this endpoint to request all Stamps available on Passport.<br /><br />If you would like to retrieve just the Stamps that are connected to a specified Ethereum address, please use the [GET Verified Stamps](#verified-stamps) endpoint.",
                "https://docs.passport.xyz/building-with-passport/stamps/passport-api/api-reference#retrieve-all-stamps-available-in-passport",
            ),
            KnownEndpoint::ModelScore => (
                "GET Model Score",
                "model-score",
                1,
                "Retrieve Sybil classification score for an Ethereum address. A score of -1 means that the given address doesn't have enough transaction history. A score of 0 means the user is likely a Sybil, and a score of 100 means the user is likely a human.",
                "https://docs.passport.xyz/building-with-passport/models/api-reference",
            ),
            KnownEndpoint::GovIdVerification => (
                "GET Gov ID Verification",
                "gov-id-verification",
                1,
                "Check if a user has completed government ID (KYC) verification with a unique proof for your action ID. Users can verify at [id.human.tech/gov-id](https://id.human.tech/gov-id).",
                "https://docs.passport.xyz/building-with-passport/individual-verifications/api-reference#check-government-id-verification",
            ),
            KnownEndpoint::PhoneVerification => (
                "GET Phone Verification",
                "phone-verification",
                2,
                "Check if a user has completed phone verification with a unique proof for your action ID. Users can verify at [id.human.tech/phone](https://id.human.tech/phone).",
                "https://docs.passport.xyz/building-with-passport/individual-verifications/api-reference#check-phone-verification",
            ),
            KnownEndpoint::BiometricsVerification => (
                "GET Biometrics Verification",
                "biometrics-verification",
                3,
                "Check if a user has completed biometric verification (face uniqueness and liveness check). Users can verify at [id.human.tech/biometrics](https://id.human.tech/biometrics).",
                "https://docs.passport.xyz/building-with-passport/individual-verifications/api-reference#check-biometrics-verification",
            ),
            KnownEndpoint::CleanHands => (
                "GET Proof of Clean Hands",
                "clean-hands",
                5,
                "Query Proof of Clean Hands attestations to verify a user is not on sanctions or PEP (Politically Exposed Persons) lists. Uses [Sign Protocol](https://sign.global) on Optimism. Users can verify at [id.human.tech/clean-hands](https://id.human.tech/clean-hands).",
                "https://docs.passport.xyz/building-with-passport/individual-verifications/api-reference#query-proof-of-clean-hands-attestations-via-sign-protocol",
            ),
        };

        EndpointMetadata {
            display_name: display_name.to_string(),
            slug: slug.to_string(),
            order,
            description: Some(description),
            docs_url: Some(docs_url),
            upstream: self.upstream(),
        }
    }

    pub fn sample_response(&self) -> Value {
        match self {
            KnownEndpoint::StampsScore => json!({
                "address": "0x...",
                "score": "25.123",
                "passing_score": true,
                "threshold": "20",
                "last_score_timestamp": "2024-01-15T10:30:00Z",
                "expiration_timestamp": "2025-01-15T10:30:00Z",
                "stamps": [
                    { "name": "Google", "credential": "..." },
                    { "name": "Discord", "credential": "..." }
                ]
            }),
            KnownEndpoint::ScoreHistory => json!({
                "address": "0x...",
                "score": "22.456",
                "timestamp": "2024-01-10T08:00:00Z",
                "stamps": [
                    { "name": "Google", "credential": "..." }
                ]
            }),
            KnownEndpoint::VerifiedStamps => json!({
                "items": [
                    {
                        "version": "1.0.0",
                        "credential": {
                            "type": ["VerifiableCredential"],
                            "credentialSubject": {
                                "id": "did:pkh:eip155:1:0x...",
                                "provider": "Google"
                            }
                        }
                    }
                ]
            }),
            KnownEndpoint::AllStamps => json!({
                "items": [
                    {
                        "id": "Google",
                        "name": "Google",
                        "description": "Connect your Google account",
                        "icon": "https://...",
                        "groups": [{ "name": "Social" }]
                    }
                ]
            }),
            KnownEndpoint::ModelScore => json!({
                "address": "0x...",
                "score": 75,
                "model": "ethereum_activity_v1"
            }),
            KnownEndpoint::GovIdVerification | KnownEndpoint::PhoneVerification => json!({
                "result": true,
                "expirationDate": 1770922106
            }),
            KnownEndpoint::BiometricsVerification => json!({
                "result": true,
                "expirationDate": 1780661994
            }),
            KnownEndpoint::CleanHands => json!({
                "data": {
                    "rows": [
                        {
                            "fullSchemaId": "onchain_evm_10_0x8",
                            "attester": "0xB1f50c6C34C72346b1229e5C80587D0D659556Fd",
                            "isReceiver": true,
                            "revoked": false,
                            "validUntil": 1735689600
                        }
                    ]
                }
            }),
        }
    }
}

/// Display configuration for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointMetadata {
    pub display_name: String,
    pub slug: String,
    pub order: u32,
    /// Markdown/HTML description that replaces the spec's own text
    pub description: Option<&'static str>,
    pub docs_url: Option<&'static str>,
    pub upstream: UpstreamApi,
}

impl EndpointMetadata {
    /// Registry entry for `id`, or the derived defaults when there is none.
    pub fn for_id(id: &str) -> Self {
        match KnownEndpoint::from_id(id) {
            Some(known) => known.metadata(),
            None => Self {
                display_name: id.to_string(),
                slug: id.replace('_', "-").to_lowercase(),
                order: DEFAULT_ORDER,
                description: None,
                docs_url: None,
                upstream: upstream_for(id),
            },
        }
    }
}

pub fn display_name(id: &str) -> String {
    EndpointMetadata::for_id(id).display_name
}

pub fn slug(id: &str) -> String {
    EndpointMetadata::for_id(id).slug
}

pub fn order(id: &str) -> u32 {
    KnownEndpoint::from_id(id).map_or(DEFAULT_ORDER, |known| known.metadata().order)
}

pub fn description(id: &str) -> Option<&'static str> {
    KnownEndpoint::from_id(id).and_then(|known| known.metadata().description)
}

pub fn docs_url(id: &str) -> Option<&'static str> {
    KnownEndpoint::from_id(id).and_then(|known| known.metadata().docs_url)
}

/// Upstream that serves `id`; unknown `iv_` ids belong to Human ID.
pub fn upstream_for(id: &str) -> UpstreamApi {
    match KnownEndpoint::from_id(id) {
        Some(known) => known.upstream(),
        None if is_individual_verification(id) => UpstreamApi::HumanId,
        None => UpstreamApi::Passport,
    }
}

/// Pretty-printed sample response, or a fixed placeholder for unknown ids.
pub fn sample_response(id: &str) -> String {
    let value = KnownEndpoint::from_id(id)
        .map(|known| known.sample_response())
        .unwrap_or_else(|| json!({ "message": "Sample response not available" }));

    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

pub fn tag_display_name(tag: &str) -> &str {
    match tag {
        "Stamp API" => "Stamps API",
        "Model Analysis" => "Models API",
        INDIVIDUAL_VERIFICATIONS_TAG => INDIVIDUAL_VERIFICATIONS_TAG,
        other => other,
    }
}

pub fn tag_order(tag: &str) -> u32 {
    match tag {
        "Stamp API" => 1,
        "Model Analysis" => 2,
        INDIVIDUAL_VERIFICATIONS_TAG => 3,
        _ => DEFAULT_ORDER,
    }
}
