//! Tests for health check and metrics endpoints.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();

    assert!(body.get("status").is_some(), "Response should have 'status' field");
    assert!(body.get("data_dir_ready").is_some());
    assert!(body.get("tables_loaded").is_some());
    assert_eq!(body["snapshot_version"], 1);

    let components = body["components"].as_array().unwrap();
    let names: Vec<&str> = components
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert!(names.contains(&"data_dir"));
    assert!(names.contains(&"tables"));
}

/// Test /health endpoint reports a valid status
#[tokio::test]
async fn test_health_endpoint_status() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body: serde_json::Value = server.get("/health").await.json();

    // Other tests share the process-wide registry
    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
}

/// Test /health/ready once a data directory has been opened
#[tokio::test]
async fn test_ready_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::OK);
}

/// Test /health/live always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health/live").await;
    response.assert_status(StatusCode::OK);
}

/// Test /metrics counts served reports
#[tokio::test]
async fn test_metrics_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/api/dashboard").await.assert_status_ok();

    let response = server.get("/metrics").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body["reports_served"].as_u64().unwrap() >= 1);
    assert!(body.get("files_written").is_some());
    assert!(body.get("snapshot_version").is_some());
}
