//! Dashboard report endpoints.

use std::time::Instant;

use axum::{extract::State, Json};
use dashboard_core::{top_tables, DashboardReport, TopTables};
use telemetry::metrics;
use tracing::debug;

use crate::extractors::DateRangeQuery;
use crate::state::AppState;

/// GET /api/dashboard - Totals, daily series, weekday split and rankings
/// for `?start=..&end=..`.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    DateRangeQuery(range): DateRangeQuery,
) -> Json<DashboardReport> {
    let start = Instant::now();
    let snapshot = state.store.snapshot();

    let report = state
        .reports
        .report(&snapshot, range, &state.settings.report)
        .await;

    metrics().reports_served.inc();
    metrics()
        .report_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    debug!(
        version = snapshot.version,
        start = %range.start,
        end = %range.end,
        clicks = report.totals.clicks,
        "Served dashboard report"
    );

    Json((*report).clone())
}

/// GET /api/top - Top queries and pages over the whole tables.
pub async fn top_handler(State(state): State<AppState>) -> Json<TopTables> {
    let snapshot = state.store.snapshot();
    metrics().top_tables_served.inc();
    Json(top_tables(&snapshot.tables, &state.settings.report))
}
