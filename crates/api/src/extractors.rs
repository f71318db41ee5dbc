//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use dashboard_core::{parse_date, DateRange};
use serde::Deserialize;
use telemetry::metrics;

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RangeParams {
    #[serde(alias = "start_date")]
    start: Option<String>,
    #[serde(alias = "end_date")]
    end: Option<String>,
}

/// Date range from `?start=..&end=..`.
///
/// Either bound may be omitted; it then falls back to the configured
/// default range. `start_date`/`end_date` are accepted as aliases.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeQuery(pub DateRange);

#[async_trait]
impl FromRequestParts<AppState> for DateRangeQuery {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<RangeParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                metrics().invalid_queries.inc();
                ApiError::bad_request(e.body_text())
            })?;

        let defaults = state.settings.default_range;
        let parse = |value: Option<String>, fallback| match value {
            Some(value) if !value.trim().is_empty() => parse_date(&value),
            _ => Ok(fallback),
        };

        match (parse(params.start, defaults.start), parse(params.end, defaults.end)) {
            (Ok(start), Ok(end)) => Ok(DateRangeQuery(DateRange::new(start, end))),
            (Err(e), _) | (_, Err(e)) => {
                metrics().invalid_queries.inc();
                Err(ApiError::from(e))
            }
        }
    }
}
