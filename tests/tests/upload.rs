//! Tests for the upload endpoint.

use axum::http::StatusCode;
use dashboard_core::DashboardReport;
use integration_tests::{fixtures, setup::TestContext};

/// Uploading a CSV replaces the table and the next report sees it
#[tokio::test]
async fn test_upload_csv_replaces_table() {
    let devices = fixtures::devices_csv(&[("mobile", 30)]);
    let ctx = TestContext::with_files(&[("Devices.csv", devices.as_bytes())]);
    let server = ctx.server();

    let payload = fixtures::upload_payload(vec![fixtures::csv_upload(
        "Devices.csv",
        &fixtures::devices_csv(&[("desktop", 8), ("tablet", 2)]),
    )]);
    let response = server.post("/api/upload").json(&payload).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["written"], 1);
    assert_eq!(body["reloaded"], true);
    assert_eq!(body["version"], 2);
    assert_eq!(body["files"][0]["status"], "written");
    assert_eq!(body["files"][0]["kind"], "csv");

    let report: DashboardReport = server.get("/api/dashboard").await.json();
    let names: Vec<&str> = report.devices.iter().map(|d| d.category.as_str()).collect();
    assert_eq!(names, vec!["desktop", "tablet"]);
}

/// A ZIP upload is expanded and its tables loaded
#[tokio::test]
async fn test_upload_zip_export() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let archive = fixtures::zip_bytes(&[
        (
            "Dates.csv",
            &fixtures::dates_csv(&[("2024-05-06", 4, 40), ("2024-05-07", 6, 60)]),
        ),
        ("Queries.csv", &fixtures::queries_csv(&[("dashboard", 11)])),
    ]);
    let payload =
        fixtures::upload_payload(vec![fixtures::zip_upload("search-export.zip", &archive)]);

    let response = server.post("/api/upload").json(&payload).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["files"][0]["kind"], "zip");
    assert_eq!(body["files"][0]["extracted"].as_array().unwrap().len(), 2);
    assert!(ctx.dir.path().join("Dates.csv").is_file());

    let report: DashboardReport = server
        .get("/api/dashboard")
        .add_query_param("start", "2024-05-01")
        .add_query_param("end", "2024-05-31")
        .await
        .json();
    assert_eq!(report.totals.clicks, 10);
    assert_eq!(report.top_queries[0].category, "dashboard");
}

/// Every file gets its own outcome; good files land even when others fail
#[tokio::test]
async fn test_upload_mixed_batch() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let payload = fixtures::upload_payload(vec![
        fixtures::csv_upload("notes.txt", "hello"),
        fixtures::csv_upload("Pages.csv", &fixtures::pages_csv(&[("/", 3)])),
        fixtures::csv_upload("../Dates.csv", "Date,Clicks,Impressions\n"),
        serde_json::json!({ "filename": "Queries.csv", "content": "data:text/csv;base64,%%%" }),
    ]);

    let response = server.post("/api/upload").json(&payload).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["received"], 4);
    assert_eq!(body["written"], 1);
    assert_eq!(body["rejected"], 3);
    assert_eq!(body["version"], 2);

    let codes: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["code"].as_str().unwrap_or("written"))
        .collect();
    assert_eq!(codes, vec!["UPLOAD_001", "written", "UPLOAD_003", "UPLOAD_002"]);
    assert!(!ctx.dir.path().parent().unwrap().join("Dates.csv").exists());
}

/// A batch where nothing is written leaves the snapshot alone
#[tokio::test]
async fn test_upload_all_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let payload = fixtures::upload_payload(vec![fixtures::csv_upload("report.xlsx", "x")]);
    let body: serde_json::Value = server.post("/api/upload").json(&payload).await.json();

    assert_eq!(body["reloaded"], false);
    assert_eq!(body["version"], 1);
    assert_eq!(ctx.store.snapshot().version, 1);
}

/// An upper-case table name still replaces that table
#[tokio::test]
async fn test_upload_uppercase_extension() {
    let countries = fixtures::countries_csv(&[("usa", 9)]);
    let ctx = TestContext::with_files(&[("Countries.csv", countries.as_bytes())]);
    let server = ctx.server();

    let payload = fixtures::upload_payload(vec![fixtures::csv_upload(
        "Countries.CSV",
        &fixtures::countries_csv(&[("nld", 1)]),
    )]);
    let body: serde_json::Value = server.post("/api/upload").json(&payload).await.json();

    assert_eq!(body["files"][0]["status"], "written");
    assert_eq!(body["version"], 2);

    let report: DashboardReport = server.get("/api/dashboard").await.json();
    let names: Vec<&str> = report.countries.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["nld"]);
}

/// Empty and over-long names are rejected per file; the rest still land
#[tokio::test]
async fn test_upload_bad_names_rejected_per_file() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let long_name = format!("{}.csv", "p".repeat(300));
    let payload = fixtures::upload_payload(vec![
        fixtures::csv_upload("Pages.csv", &fixtures::pages_csv(&[("/", 3)])),
        fixtures::csv_upload("", "Top pages,Clicks\n"),
        fixtures::csv_upload(&long_name, "Top pages,Clicks\n"),
    ]);

    let response = server.post("/api/upload").json(&payload).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["written"], 1);
    assert_eq!(body["files"][0]["status"], "written");
    assert_eq!(body["files"][1]["code"], "UPLOAD_003");
    assert_eq!(body["files"][2]["code"], "UPLOAD_003");

    let top: serde_json::Value = server.get("/api/top").await.json();
    assert_eq!(top["top_pages"][0]["category"], "/");
}

/// Empty batches fail validation
#[tokio::test]
async fn test_upload_empty_batch() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/upload")
        .json(&fixtures::upload_payload(vec![]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

/// Bodies that are not an upload batch are rejected
#[tokio::test]
async fn test_upload_malformed_body() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/upload")
        .content_type("application/json")
        .bytes("{\"files\": 42}".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

/// Uploads larger than axum's default body limit are accepted
#[tokio::test]
async fn test_upload_large_file() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let rows: Vec<(String, u64)> = (0..200_000).map(|i| (format!("/page/{}", i), 1)).collect();
    let borrowed: Vec<(&str, u64)> = rows.iter().map(|(p, c)| (p.as_str(), *c)).collect();
    let csv = fixtures::pages_csv(&borrowed);
    assert!(csv.len() > 2 * 1024 * 1024);

    let payload = fixtures::upload_payload(vec![fixtures::csv_upload("Pages.csv", &csv)]);
    let response = server.post("/api/upload").json(&payload).await;
    response.assert_status_ok();

    let body: serde_json::Value = server.get("/api/tables").await.json();
    assert_eq!(body["rows"]["pages"], 200_000);
}
