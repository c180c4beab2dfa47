// Integration tests for the API playground
// These tests drive a request from draft to upstream and back

use playground_client::{
    GlobalParams, NETWORK_ERROR, ProxyRequestBuilder, ProxyRoute, RequestDraft, RequestExecutor,
    decode_proxied_target,
};
use playground_core::PlaygroundConfig;
use playground_openapi::{HttpMethod, SpecLoader, SpecSnapshot, build_url, can_send_request};
use playground_server::{AppState, ReqwestUpstream, create_router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const SPEC_JSON: &str = r#"{
    "openapi": "3.0.0",
    "info": {"title": "Passport API", "version": "2.0.0"},
    "servers": [{"url": "https://api.passport.xyz"}],
    "paths": {
        "/v2/stamps/{scorer_id}/score/{address}": {
            "get": {
                "operationId": "v2_api_api_stamps_a_submit_passport",
                "summary": "Retrieve Stamp-based unique humanity score",
                "tags": ["Stamp API"],
                "security": [{"ApiKeyAuth": []}],
                "parameters": [
                    {"name": "scorer_id", "in": "path", "required": true, "schema": {"type": "integer"}},
                    {"name": "address", "in": "path", "required": true, "schema": {"type": "string"}}
                ],
                "responses": {"200": {"description": "OK"}}
            }
        }
    }
}"#;

fn snapshot() -> SpecSnapshot {
    SpecSnapshot::parse(SPEC_JSON).unwrap()
}

/// Serve the playground on an ephemeral port and return its origin.
async fn spawn_server(config: &PlaygroundConfig) -> String {
    let loader = Arc::new(SpecLoader::new(
        "http://127.0.0.1:9/openapi.json",
        Duration::from_secs(3600),
    ));
    loader.prime(snapshot()).await;

    let state = AppState::new(config, Arc::new(ReqwestUpstream::new()), loader);
    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[test]
fn test_gov_id_url_and_routing() {
    let snapshot = snapshot();
    let gov_id = snapshot.endpoint("iv_gov_id_verification").unwrap();

    let path = [("network".to_string(), "optimism".to_string())].into_iter().collect();
    let query = [
        ("user".to_string(), "0xABC".to_string()),
        ("action-id".to_string(), "123456789".to_string()),
    ]
    .into_iter()
    .collect();

    let url = build_url("https://api.holonym.io", &gov_id.path, &path, &query);
    assert_eq!(
        url,
        "https://api.holonym.io/sybil-resistance/gov-id/optimism?user=0xABC&action-id=123456789"
    );
    assert!(can_send_request(gov_id, &path, &query));

    let config = PlaygroundConfig::test_defaults();
    let builder =
        ProxyRequestBuilder::new(&config.server.public_origin(), &config.upstreams).unwrap();

    // host rule and registry agree
    let by_host = builder.build_proxied_request(HttpMethod::Get, &url, None).unwrap();
    let by_endpoint = builder
        .build_for_endpoint(&gov_id.id, HttpMethod::Get, &url, None)
        .unwrap();
    assert_eq!(by_host, by_endpoint);
    assert!(by_host.url.starts_with("http://localhost:3000/api/proxy/holonym?"));

    let target = decode_proxied_target(&by_host.url).unwrap();
    assert_eq!(target.upstream_url("https://api.holonym.io"), url);
}

#[tokio::test]
async fn test_unfilled_required_params_issue_no_request() {
    let mut upstream = mockito::Server::new_async().await;
    let never = upstream.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

    let mut config = PlaygroundConfig::test_defaults();
    config.upstreams.passport = upstream.url();

    let snapshot = snapshot();
    let endpoint = snapshot.endpoint("v2_api_api_stamps_a_submit_passport").unwrap();
    let draft = RequestDraft::mount(endpoint, &GlobalParams::new(), "");

    assert!(!draft.can_send());
    assert_eq!(
        draft.url(&upstream.url()),
        format!("{}/v2/stamps/{{scorer_id}}/score/{{address}}", upstream.url())
    );

    let builder =
        ProxyRequestBuilder::new(&config.server.public_origin(), &config.upstreams).unwrap();
    assert!(draft.prepare(&builder, &upstream.url(), None).is_err());

    never.assert_async().await;
}

#[tokio::test]
async fn test_network_failure_is_normalized() {
    // nothing listens on the discard port
    let mut config = PlaygroundConfig::test_defaults();
    config.server.public_origin = Some("http://127.0.0.1:9".to_string());

    let builder =
        ProxyRequestBuilder::new(&config.server.public_origin(), &config.upstreams).unwrap();
    let request = builder
        .build_proxied_request(
            HttpMethod::Get,
            "https://api.passport.xyz/v2/stamps/335/score/0xabc",
            None,
        )
        .unwrap();

    let response = RequestExecutor::new().execute(&request).await;

    assert_eq!(response.status, 0);
    assert_eq!(response.status_text, NETWORK_ERROR);
    assert!(response.headers.is_empty());
    assert!(response.data["error"].is_string());
}

#[tokio::test]
async fn test_passport_round_trip_through_proxy() {
    let mut upstream = mockito::Server::new_async().await;
    let mock = upstream
        .mock("GET", "/v2/stamps/335/score/0xabc")
        .match_header("x-api-key", "test-api-key")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("x-response-time", "42")
        .with_body(r#"{"address":"0xabc","score":"21.5"}"#)
        .create_async()
        .await;

    let mut config = PlaygroundConfig::test_defaults();
    config.upstreams.passport = upstream.url();
    let origin = spawn_server(&config).await;

    let snapshot = snapshot();
    let globals = GlobalParams::new();
    let mut draft = RequestDraft::mount(
        snapshot.endpoint("v2_api_api_stamps_a_submit_passport").unwrap(),
        &globals,
        config.credentials.seed_scorer_id(),
    );
    draft.set_path_param("address", "0xabc");

    let builder = ProxyRequestBuilder::new(&origin, &config.upstreams).unwrap();
    let request = draft.prepare(&builder, &upstream.url(), None).unwrap();
    assert!(request.url.starts_with(&format!("{}{}?", origin, ProxyRoute::Passport.path())));

    let response = RequestExecutor::new().execute(&request).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"address": "0xabc", "score": "21.5"}));
    assert_eq!(response.headers["x-proxy-status"], "200");
    assert_eq!(response.headers["x-proxy-duration"], "42");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_holonym_round_trip_sends_no_key() {
    let mut upstream = mockito::Server::new_async().await;
    let mock = upstream
        .mock("GET", "/sybil-resistance/phone/base-sepolia")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("user".into(), "0xABC".into()),
            mockito::Matcher::UrlEncoded("action-id".into(), "123456789".into()),
        ]))
        .match_header("x-api-key", mockito::Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result":true}"#)
        .create_async()
        .await;

    let mut config = PlaygroundConfig::test_defaults();
    config.upstreams.holonym = upstream.url();
    let origin = spawn_server(&config).await;

    let snapshot = snapshot();
    let mut draft = RequestDraft::mount(
        snapshot.endpoint("iv_phone_verification").unwrap(),
        &GlobalParams::new(),
        "",
    );
    draft.set_path_param("network", "base-sepolia");
    draft.set_query_param("user", "0xABC");

    let builder = ProxyRequestBuilder::new(&origin, &config.upstreams).unwrap();
    let request = draft.prepare(&builder, &upstream.url(), None).unwrap();

    // the mock upstream shares a host with nothing else, so both rules agree
    let by_host = builder
        .build_proxied_request(HttpMethod::Get, &draft.url(&upstream.url()), None)
        .unwrap();
    assert_eq!(by_host.url, request.url);

    let response = RequestExecutor::new().execute(&request).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"result": true}));
    assert_eq!(response.headers["x-proxy-duration"], "0");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_sign_proxy_rejects_post() {
    let config = PlaygroundConfig::test_defaults();
    let origin = spawn_server(&config).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/proxy/sign?path=%2Fapi%2Fscan", origin))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}
