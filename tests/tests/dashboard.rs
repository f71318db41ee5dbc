//! Tests for the dashboard, top-N and table endpoints.

use axum::http::StatusCode;
use chrono::NaiveDate;
use dashboard_core::{CategoryScope, DashboardReport, ReportOptions, TopTables};
use integration_tests::{fixtures, setup::TestContext};

fn seeded() -> TestContext {
    let dates = fixtures::dates_csv(&[
        ("2024-01-01", 10, 100),
        ("2024-01-02", 5, 50),
        ("2024-01-08", 7, 70),
        ("2023-12-31", 99, 999),
    ]);
    let devices = fixtures::devices_csv(&[("mobile", 30), ("desktop", 20), ("mobile", 10)]);
    let countries = fixtures::countries_csv(&[
        ("usa", 50),
        ("deu", 40),
        ("fra", 30),
        ("gbr", 20),
        ("esp", 10),
        ("ita", 5),
    ]);
    let queries = fixtures::queries_csv(&[("rust", 9), ("axum", 3), ("tokio", 3)]);
    let pages = fixtures::pages_csv(&[("/", 12), ("/docs", 4)]);

    TestContext::with_files(&[
        ("Dates.csv", dates.as_bytes()),
        ("Devices.csv", devices.as_bytes()),
        ("Countries.csv", countries.as_bytes()),
        ("Queries.csv", queries.as_bytes()),
        ("Pages.csv", pages.as_bytes()),
    ])
}

/// Totals, series and weekday split cover only the requested range
#[tokio::test]
async fn test_dashboard_date_range() {
    let ctx = seeded();
    let server = ctx.server();

    let response = server
        .get("/api/dashboard")
        .add_query_param("start", "2024-01-01")
        .add_query_param("end", "2024-01-02")
        .await;
    response.assert_status_ok();

    let report: DashboardReport = response.json();
    assert_eq!(report.totals.clicks, 15);
    assert_eq!(report.totals.impressions, 150);
    assert_eq!(report.series.len(), 2);
    assert_eq!(
        report.series[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );

    let days: Vec<(&str, u64)> = report
        .weekdays
        .iter()
        .map(|w| (w.day.as_str(), w.clicks))
        .collect();
    assert_eq!(days, vec![("Monday", 10), ("Tuesday", 5)]);
}

/// Weekday sums fold every matching date onto its day of the week
#[tokio::test]
async fn test_dashboard_weekdays_accumulate() {
    let ctx = seeded();
    let server = ctx.server();

    let report: DashboardReport = server
        .get("/api/dashboard")
        .add_query_param("start", "2024-01-01")
        .add_query_param("end", "2024-01-31")
        .await
        .json();

    assert_eq!(report.totals.clicks, 22);
    assert_eq!(report.weekdays[0].day, "Monday");
    assert_eq!(report.weekdays[0].clicks, 17);
}

/// Rankings group duplicates, sort descending, and keep five entries
#[tokio::test]
async fn test_dashboard_rankings() {
    let ctx = seeded();
    let server = ctx.server();

    let report: DashboardReport = server.get("/api/dashboard").await.json();

    assert_eq!(report.devices[0].category, "mobile");
    assert_eq!(report.devices[0].clicks, 40);
    assert_eq!(report.devices.len(), 2);

    assert_eq!(report.countries.len(), 5);
    assert!(report.countries.iter().all(|c| c.category != "ita"));

    assert_eq!(report.top_queries[0].category, "rust");
    // Ties ordered by name
    assert_eq!(report.top_queries[1].category, "axum");
    assert_eq!(report.top_pages[0].category, "/");
}

/// Missing parameters fall back to the configured default range
#[tokio::test]
async fn test_dashboard_default_range() {
    let ctx = seeded();
    let server = ctx.server();

    let report: DashboardReport = server.get("/api/dashboard").await.json();

    assert_eq!(report.range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(report.range.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    // 2023-12-31 is outside the default range
    assert_eq!(report.totals.clicks, 22);
}

/// A start after the end yields an empty report, not an error
#[tokio::test]
async fn test_dashboard_inverted_range() {
    let ctx = seeded();
    let server = ctx.server();

    let response = server
        .get("/api/dashboard")
        .add_query_param("start", "2024-02-01")
        .add_query_param("end", "2024-01-01")
        .await;
    response.assert_status_ok();

    let report: DashboardReport = response.json();
    assert_eq!(report.totals.clicks, 0);
    assert!(report.series.is_empty());
    assert!(report.weekdays.is_empty());
}

/// Unparseable dates return DATE_001
#[tokio::test]
async fn test_dashboard_bad_date() {
    let ctx = seeded();
    let server = ctx.server();

    let response = server
        .get("/api/dashboard")
        .add_query_param("start", "yesterday")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DATE_001");
}

/// An empty data directory serves zeroed reports
#[tokio::test]
async fn test_dashboard_without_tables() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let report: DashboardReport = server.get("/api/dashboard").await.json();

    assert_eq!(report.totals.clicks, 0);
    assert!(report.devices.is_empty());
    assert!(report.top_pages.is_empty());
}

/// Date-scoped rankings drop rows dated outside the range
#[tokio::test]
async fn test_dashboard_date_scoped_rankings() {
    let devices = "Date,Device,Clicks\n2024-01-01,mobile,5\n2023-06-01,desktop,50\n,tablet,1\n";
    let ctx = TestContext::with_files_and_options(
        &[("Devices.csv", devices.as_bytes())],
        ReportOptions {
            category_scope: CategoryScope::DateRange,
            ..ReportOptions::default()
        },
    );
    let server = ctx.server();

    let report: DashboardReport = server.get("/api/dashboard").await.json();

    let names: Vec<&str> = report.devices.iter().map(|d| d.category.as_str()).collect();
    assert_eq!(names, vec!["mobile", "tablet"]);
}

/// /api/top ranks queries and pages over the whole tables
#[tokio::test]
async fn test_top_tables() {
    let ctx = seeded();
    let server = ctx.server();

    let response = server.get("/api/top").await;
    response.assert_status_ok();

    let top: TopTables = response.json();
    assert_eq!(top.top_queries.len(), 3);
    assert_eq!(top.top_pages[0].clicks, 12);
}

/// /api/tables lists row counts and per-file outcomes
#[tokio::test]
async fn test_tables_listing() {
    let ctx = seeded();
    let server = ctx.server();

    let body: serde_json::Value = server.get("/api/tables").await.json();

    assert_eq!(body["version"], 1);
    assert_eq!(body["rows"]["dates"], 4);
    assert_eq!(body["rows"]["devices"], 3);

    let filters = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["table"] == "filters")
        .unwrap();
    assert_eq!(filters["status"], "missing");
}

/// A malformed table is reported and the others still load
#[tokio::test]
async fn test_tables_reports_failed_file() {
    let ctx = TestContext::with_files(&[
        ("Devices.csv", b"Device,Clicks\nmobile,lots\n"),
        ("Pages.csv", b"Top pages,Clicks\n/,3\n"),
    ]);
    let server = ctx.server();

    let body: serde_json::Value = server.get("/api/tables").await.json();
    let devices = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["table"] == "devices")
        .unwrap();

    assert_eq!(devices["status"], "failed");
    assert_eq!(devices["code"], "FILE_003");
    assert_eq!(body["rows"]["pages"], 1);
}

/// Reload picks up files changed on disk and bumps the version
#[tokio::test]
async fn test_reload() {
    let ctx = seeded();
    let server = ctx.server();

    let before: DashboardReport = server.get("/api/dashboard").await.json();
    assert_eq!(before.totals.clicks, 22);

    ctx.write_file(
        "Dates.csv",
        fixtures::daily_dates_csv(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 3, 2).as_bytes(),
    );
    let response = server.post("/api/reload").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["version"], 2);

    let after: DashboardReport = server.get("/api/dashboard").await.json();
    assert_eq!(after.totals.clicks, 6);
    assert_eq!(after.series.len(), 3);
}
