//! Integration tests for the postback ingestion endpoint.
//!
//! Drives the full pipeline through the router with the in-memory store
//! backend: validation rejections, both addressing schemes, store
//! unavailability, and partial fan-out outcomes.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use postfan_api::{create_router, AppState};
use postfan_store::{EnqueueConfig, Enqueuer, MemoryStore, StorageScheme};
use serde_json::json;
use tower::ServiceExt;

fn test_app(config: EnqueueConfig) -> (Router, Arc<MemoryStore>) {
    let store = MemoryStore::new_shared();
    let enqueuer = Arc::new(Enqueuer::new(store.clone(), config));
    let app = create_router(AppState::new(enqueuer));
    (app, store)
}

fn ingest_request(payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize payload")))
        .expect("build request")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body =
        axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read response body");
    serde_json::from_slice(&body).expect("parse response json")
}

fn frog_payload() -> serde_json::Value {
    json!({
        "endpoint": {
            "method": "GET",
            "url": "http://example.com/data?key={key}&value={value}"
        },
        "data": [
            {"key": "Azureus", "value": "Dendrobates"},
            {"key": "Phyllobates", "value": "Terribilis"}
        ]
    })
}

#[tokio::test]
async fn ingest_appends_one_unit_per_record_in_order() {
    let (app, store) = test_app(EnqueueConfig::default());

    let response = app.oneshot(ingest_request(&frog_payload())).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["enqueued"], 2);
    assert_eq!(body["failed_records"], json!([]));

    let entries = store.list("request");
    assert_eq!(entries.len(), 2);

    let first: serde_json::Value = serde_json::from_str(&entries[0]).expect("first unit json");
    assert_eq!(
        first,
        json!({
            "method": "GET",
            "url": "http://example.com/data?key={key}&value={value}",
            "data": {"key": "Azureus", "value": "Dendrobates"}
        })
    );

    let second: serde_json::Value = serde_json::from_str(&entries[1]).expect("second unit json");
    assert_eq!(second["data"]["key"], "Phyllobates");
}

#[tokio::test]
async fn counter_scheme_writes_addressable_records() {
    let config = EnqueueConfig {
        scheme: StorageScheme::CounterAddressed,
        ..EnqueueConfig::default()
    };
    let (app, store) = test_app(config);

    let response = app.oneshot(ingest_request(&frog_payload())).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.counter("postback_tail"), 2);

    let first = store.record_fields("postback:1").expect("postback:1 exists");
    let endpoint: serde_json::Value =
        serde_json::from_str(&first["endpoint"]).expect("endpoint json");
    let data: serde_json::Value = serde_json::from_str(&first["data"]).expect("data json");
    assert_eq!(endpoint["method"], "GET");
    assert_eq!(endpoint["url"], "http://example.com/data?key={key}&value={value}");
    assert_eq!(data["key"], "Azureus");

    let second = store.record_fields("postback:2").expect("postback:2 exists");
    let data: serde_json::Value = serde_json::from_str(&second["data"]).expect("data json");
    assert_eq!(data["key"], "Phyllobates");
}

#[tokio::test]
async fn invalid_url_is_rejected_with_zero_writes() {
    let (app, store) = test_app(EnqueueConfig::default());

    let payload = json!({
        "endpoint": {"method": "GET", "url": "not a url"},
        "data": [{"key": "v"}]
    });
    let response = app.oneshot(ingest_request(&payload)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E1002");

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn unsupported_method_is_rejected_with_zero_writes() {
    let (app, store) = test_app(EnqueueConfig::default());

    let payload = json!({
        "endpoint": {"method": "DELETE", "url": "http://example.com/"},
        "data": [{"key": "v"}]
    });
    let response = app.oneshot(ingest_request(&payload)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E1003");
    assert!(body["error"]["message"].as_str().expect("message").contains("DELETE"));

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (app, store) = test_app(EnqueueConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("content-type", "application/json")
        .body(Body::from("raw POST data"))
        .expect("build request");
    let response = app.oneshot(request).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E1001");

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn empty_data_is_rejected() {
    let (app, store) = test_app(EnqueueConfig::default());

    let payload = json!({
        "endpoint": {"method": "GET", "url": "http://example.com/"},
        "data": []
    });
    let response = app.oneshot(ingest_request(&payload)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E1004");

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn unreachable_store_is_terminal_before_any_write() {
    let (app, store) = test_app(EnqueueConfig::default());
    store.set_unavailable(true);

    let response = app.oneshot(ingest_request(&frog_payload())).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E3001");

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn partial_failure_reports_failed_record_indices() {
    let (app, store) = test_app(EnqueueConfig::default());
    // Store dies after the first record of three.
    store.fail_after_writes(1);

    let payload = json!({
        "endpoint": {"method": "POST", "url": "http://example.com/hook"},
        "data": [{"n": 1}, {"n": 2}, {"n": 3}]
    });
    let response = app.oneshot(ingest_request(&payload)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = response_json(response).await;
    assert_eq!(body["enqueued"], 1);

    let failed = body["failed_records"].as_array().expect("failed_records array");
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["index"], 1);
    assert_eq!(failed[1]["index"], 2);

    // The record that succeeded stays written; nothing is rolled back.
    let entries = store.list("request");
    assert_eq!(entries.len(), 1);
    let written: serde_json::Value = serde_json::from_str(&entries[0]).expect("unit json");
    assert_eq!(written["data"]["n"], 1);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _store) = test_app(EnqueueConfig::default());

    let response = app.oneshot(ingest_request(&frog_payload())).await.expect("execute request");

    assert!(response.headers().contains_key("X-Request-Id"));
}

#[tokio::test]
async fn health_reflects_store_connectivity() {
    let (app, store) = test_app(EnqueueConfig::default());

    let request = Request::builder().uri("/health").body(Body::empty()).expect("build request");
    let response = app.clone().oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["store"]["status"], "up");

    store.set_unavailable(true);
    let request = Request::builder().uri("/health").body(Body::empty()).expect("build request");
    let response = app.oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn liveness_does_not_touch_the_store() {
    let (app, store) = test_app(EnqueueConfig::default());
    store.set_unavailable(true);

    let request = Request::builder().uri("/live").body(Body::empty()).expect("build request");
    let response = app.oneshot(request).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);
}
