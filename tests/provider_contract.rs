//! Stats Endpoint Contract Tests
//!
//! These tests verify the exact HTTP contract of the stats fetch against a
//! mock server:
//! - GET is issued against `{base}/{id}`
//! - counters are read from `meta.resource` in the JSON body
//! - non-2xx responses map to provider failures carrying the status
//! - malformed bodies map to provider failures instead of panics

use filepulse::TrackError;
use filepulse::provider::{HttpStatsProvider, StatsProvider};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stats_body(name: &str, user_count: u64, like_count: u64) -> serde_json::Value {
    json!({
        "meta": {
            "resource": {
                "name": name,
                "user_count": user_count,
                "like_count": like_count
            }
        }
    })
}

#[tokio::test]
async fn test_fetch_gets_the_id_path_and_reads_counters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/123456789"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(stats_body("Design Handbook", 12345, 678)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider =
        HttpStatsProvider::new(format!("{}/files", mock_server.uri())).expect("provider");
    let stats = provider.fetch("123456789").await.expect("fetch");

    assert_eq!(stats.name, "Design Handbook");
    assert_eq!(stats.user_count, 12_345);
    assert_eq!(stats.like_count, 678);
}

#[tokio::test]
async fn test_fetch_ignores_extra_body_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {
                "request_id": "r-123",
                "resource": {
                    "name": "Quarterly Plan",
                    "user_count": 7,
                    "like_count": 3,
                    "owner": "someone",
                    "visibility": "public"
                }
            },
            "data": {"unused": true}
        })))
        .mount(&mock_server)
        .await;

    let provider =
        HttpStatsProvider::new(format!("{}/files", mock_server.uri())).expect("provider");
    let stats = provider.fetch("42").await.expect("fetch");

    assert_eq!(stats.name, "Quarterly Plan");
    assert_eq!(stats.user_count, 7);
}

#[tokio::test]
async fn test_not_found_is_a_provider_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let provider =
        HttpStatsProvider::new(format!("{}/files", mock_server.uri())).expect("provider");
    let result = provider.fetch("999").await;

    match result {
        Err(TrackError::Provider(message)) => {
            assert!(message.contains("404"), "message should carry the status");
        }
        other => panic!("expected provider failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_a_provider_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let provider =
        HttpStatsProvider::new(format!("{}/files", mock_server.uri())).expect("provider");
    let result = provider.fetch("1").await;

    assert!(matches!(result, Err(TrackError::Provider(_))));
}

#[tokio::test]
async fn test_malformed_body_is_a_provider_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let provider =
        HttpStatsProvider::new(format!("{}/files", mock_server.uri())).expect("provider");
    let result = provider.fetch("1").await;

    assert!(matches!(result, Err(TrackError::Provider(_))));
}

#[tokio::test]
async fn test_body_missing_the_resource_object_is_a_provider_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {}})))
        .mount(&mock_server)
        .await;

    let provider =
        HttpStatsProvider::new(format!("{}/files", mock_server.uri())).expect("provider");
    let result = provider.fetch("1").await;

    assert!(matches!(result, Err(TrackError::Provider(_))));
}
