//! Tests for the HTTP client module

use super::*;
use crate::error::{Error, ErrorKind};
use crate::types::Method;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.base_url.is_none());
    assert!(config.default_headers.is_empty());
    assert!(config.user_agent.starts_with("inventory-fetch/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .header("Accept", "application/json")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(
        config.default_headers.get("Accept"),
        Some(&"application/json".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_api_request_query_replaces_existing_key() {
    let mut request = ApiRequest::new(Method::GET, "/aps")
        .query("limit", "25")
        .query("offset", "0");
    request.set_query("offset", "7");

    assert_eq!(request.query.len(), 2);
    assert_eq!(request.query_value("limit"), Some("25"));
    assert_eq!(request.query_value("offset"), Some("7"));
    assert_eq!(request.query_value("missing"), None);
}

#[tokio::test]
async fn test_execute_returns_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/monitoring/aps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aps": [{"serial": "CN01"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body = client
        .execute(&ApiRequest::new(Method::GET, "/monitoring/aps"))
        .await
        .unwrap();

    assert_eq!(body["aps"][0]["serial"], "CN01");
}

#[tokio::test]
async fn test_execute_sends_query_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/aps"))
        .and(query_param("limit", "25"))
        .and(query_param("offset", "3"))
        .and(header("Authorization", "Bearer T1"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"aps": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/", mock_server.uri()))
        .header("Accept", "application/json")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let request = ApiRequest::new(Method::GET, "aps")
        .query("limit", "25")
        .query("offset", "3")
        .header("Authorization", "Bearer T1");
    client.execute(&request).await.unwrap();
}

#[tokio::test]
async fn test_execute_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_json(json!({"grant_type": "refresh_token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request =
        ApiRequest::new(Method::POST, "/oauth2/token").json(json!({"grant_type": "refresh_token"}));
    let body = client.execute(&request).await.unwrap();

    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_error_header_is_auth_error_even_on_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("error", "invalid_token")
                .insert_header("error_description", "Refresh token expired")
                .set_body_json(json!({})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .execute(&ApiRequest::new(Method::POST, "/oauth2/token"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.to_string().contains("invalid_token: Refresh token expired"));
}

#[tokio::test]
async fn test_error_header_wins_over_failure_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/aps"))
        .respond_with(ResponseTemplate::new(401).insert_header("error", "invalid_token"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .execute(&ApiRequest::new(Method::GET, "/aps"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_failure_status_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/aps"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .execute(&ApiRequest::new(Method::GET, "/aps"))
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_server_is_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"aps": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(100))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client
        .execute(&ApiRequest::new(Method::GET, "/slow"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(err, Error::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn test_non_json_body_is_schema_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .execute(&ApiRequest::new(Method::GET, "/html"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[tokio::test]
async fn test_absolute_url_bypasses_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("http://127.0.0.1:9")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let body = client
        .execute(&ApiRequest::new(
            Method::GET,
            format!("{}/elsewhere", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(body["value"], 42);
}
