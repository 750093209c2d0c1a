//! Health endpoint integration tests
//!
//! Tests for the operational endpoints:
//! - GET /health - Full health check with dependency status
//! - GET /health/ready - Readiness probe
//! - GET /health/live - Liveness probe
//! - GET /metrics - Prometheus exposition
//! - GET /openapi.json - API description

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::test_server;

#[tokio::test]
async fn test_health_endpoint_returns_proper_structure() {
    let server = test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json: Value = response.json();

    // Verify response structure
    assert!(json.get("status").is_some(), "Response should have 'status' field");
    assert!(json.get("version").is_some(), "Response should have 'version' field");
    assert!(json.get("uptime_seconds").is_some(), "Response should have 'uptime_seconds' field");
    assert!(json.get("timestamp").is_some(), "Response should have 'timestamp' field");
    assert!(json.get("checks").is_some(), "Response should have 'checks' field");
    assert!(json.get("stats").is_some(), "Response should have 'stats' field");

    assert_eq!(json["status"], "healthy");

    // Verify tokenizer check structure
    let tokenizer_check = &json["checks"]["tokenizer"];
    assert_eq!(tokenizer_check["status"], "healthy");
    assert!(tokenizer_check.get("latency_ms").is_some(), "Tokenizer check should have 'latency_ms'");
    assert!(tokenizer_check.get("error").is_none());
}

#[tokio::test]
async fn test_health_reports_loaded_encodings() {
    let server = test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let json: Value = response.json();
    let loaded: Vec<&str> = json["stats"]["encodings_loaded"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();

    // The health check builds the gpt-4o encoder
    assert!(loaded.contains(&"o200k_base"), "loaded: {loaded:?}");
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let server = test_server();

    let response = server.get("/health/ready").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let server = test_server();

    let response = server.get("/health/live").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_health_endpoint_returns_version() {
    let server = test_server();

    let json: Value = server.get("/health").await.json();

    // Version should be the package version from Cargo.toml
    let version = json["version"].as_str().unwrap();
    assert_eq!(version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_endpoint_returns_valid_timestamp() {
    let server = test_server();

    let json: Value = server.get("/health").await.json();

    let timestamp = json["timestamp"].as_str().unwrap();
    let parsed = chrono::DateTime::parse_from_rfc3339(timestamp);
    assert!(parsed.is_ok(), "Timestamp should be valid RFC3339 format");
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_health_stats_fields() {
    let server = test_server();

    let json: Value = server.get("/health").await.json();

    // Uptime is reported once, at the top level
    let stats = json["stats"].as_object().unwrap();
    let keys: Vec<&str> = stats.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["encodings_loaded"]);
}

#[tokio::test]
async fn test_health_endpoints_accept_get_only() {
    let server = test_server();

    // POST should not be allowed
    let response = server.post("/health").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = server.post("/health/ready").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = server.post("/health/live").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_openapi_document() {
    let server = test_server();

    let response = server.get("/openapi.json").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert!(json["paths"].get("/tokenize-text").is_some());
    assert!(json["paths"].get("/tokenize-file").is_some());
    assert_eq!(json["info"]["title"], "Tally API");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = test_server();

    let response = server.get("/does-not-exist").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let server = test_server();

    tally::metrics::init_metrics();
    server
        .post("/tokenize-text")
        .json(&serde_json::json!({"text": "metrics"}))
        .await
        .assert_status_ok();

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert!(response.text().contains("tally_requests_total"));
}
