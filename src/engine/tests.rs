//! Tests for engine module

use super::*;
use crate::auth::MemorySecretStore;
use crate::error::ErrorKind;
use crate::pagination::FetchStats;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, extra: &str) -> AppConfig {
    let yaml = format!(
        r#"
base_url: "{}"
refresh_uri: "/oauth2/token"
refresh_method: POST
bss_uri: "/bss"
bss_method: GET
apinfo_uri: "/aps"
apinfo_method: GET
fetch:
  rate_per_second: 2
  pacing: unpaced
{extra}"#,
        server.uri()
    );
    AppConfig::from_yaml(&yaml).unwrap()
}

fn store() -> Arc<MemorySecretStore> {
    Arc::new(MemorySecretStore::new(Credentials::new(
        "client-1", "shh", "T1", "R1",
    )))
}

async fn mount_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T2",
            "refresh_token": "R2"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_pages(server: &MockServer, listing: &str, pages: &[serde_json::Value]) {
    for (offset, items) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(listing))
            .and(query_param("offset", offset.to_string()))
            .and(header("Authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "aps": items })))
            .mount(server)
            .await;
    }
}

// ============================================================================
// RunStats Tests
// ============================================================================

#[test]
fn test_run_stats_accumulate() {
    let mut stats = RunStats::new();
    stats.add_refresh();
    stats.add_fetch(&FetchStats {
        batches: 2,
        requests: 14,
        records: 40,
        batch_offsets: vec![0, 7],
        elapsed: Duration::from_millis(300),
    });

    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.requests, 15);
    assert_eq!(stats.records, 40);
    assert_eq!(stats.fetch_time, Duration::from_millis(300));
    assert!(stats.exceeds(10));
    assert!(!stats.exceeds(15));
}

// ============================================================================
// FetchEngine Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_persists_rotated_tokens() {
    let server = MockServer::start().await;
    mount_refresh(&server).await;

    let store = store();
    let mut engine = FetchEngine::new(config_for(&server, ""), store.clone()).unwrap();

    let rotated = engine.refresh().await.unwrap();

    assert_eq!(rotated.access_token, "T2");
    assert_eq!(store.current().await, rotated);
    assert_eq!(store.save_count().await, 1);
    assert_eq!(engine.stats().requests, 1);
}

#[tokio::test]
async fn test_refresh_failure_is_labelled_and_not_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let store = store();
    let mut engine = FetchEngine::new(config_for(&server, ""), store.clone()).unwrap();

    let err = engine.refresh().await.unwrap_err();

    assert_eq!(err.phase(), Some(&Phase::Refresh));
    assert_eq!(err.kind(), ErrorKind::Http);
    assert!(err.to_string().starts_with("token refresh failed (http error)"));
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn test_run_fetches_each_resource_with_new_token() {
    let server = MockServer::start().await;
    mount_refresh(&server).await;
    mount_pages(
        &server,
        "/bss",
        &[json!([{"serial": "A"}]), json!([{"serial": "B"}]), json!([]), json!([])],
    )
    .await;
    mount_pages(&server, "/aps", &[json!([{"serial": "A", "status": "Up"}]), json!([])]).await;

    let mut engine = FetchEngine::new(config_for(&server, ""), store()).unwrap();
    let fetched = engine.run(&Resource::all()).await.unwrap();

    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].resource, Resource::Bss);
    assert_eq!(fetched[0].result.records.len(), 2);
    assert_eq!(fetched[0].result.stats.batch_offsets, vec![0, 2]);
    assert_eq!(fetched[1].resource, Resource::Apinfo);
    assert_eq!(fetched[1].result.records[0]["status"], "Up");

    let stats = engine.stats();
    assert_eq!(stats.fetches, 2);
    assert_eq!(stats.records, 3);
    // refresh + 4 bss pages + 2 apinfo pages
    assert_eq!(stats.requests, 7);
}

#[tokio::test]
async fn test_fetch_failure_is_labelled_with_resource() {
    let server = MockServer::start().await;
    mount_refresh(&server).await;
    Mock::given(method("GET"))
        .and(path("/aps"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut engine = FetchEngine::new(config_for(&server, ""), store()).unwrap();
    let err = engine.run(&[Resource::Apinfo]).await.unwrap_err();

    assert_eq!(err.phase(), Some(&Phase::Fetch("apinfo".to_string())));
    assert_eq!(err.kind(), ErrorKind::Http);
}

#[tokio::test]
async fn test_items_field_from_config() {
    let server = MockServer::start().await;
    mount_refresh(&server).await;
    for offset in 0..2 {
        let items = if offset == 0 { json!([1, 2]) } else { json!([]) };
        Mock::given(method("GET"))
            .and(path("/aps"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": items })))
            .mount(&server)
            .await;
    }

    let config = config_for(&server, "  apinfo_items_field: devices\n");
    let mut engine = FetchEngine::new(config, store()).unwrap();
    let fetched = engine.run(&[Resource::Apinfo]).await.unwrap();

    assert_eq!(fetched[0].result.records, vec![json!(1), json!(2)]);
}
