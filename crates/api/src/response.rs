//! Standardized API responses.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use dashboard_core::{TableKind, UploadOutcome};
use datastore::{archive::ArchiveOutcome, Snapshot, TableLoad, UploadResult};
use serde::{Deserialize, Serialize};
use telemetry::ComponentHealthReport;

/// Response for an upload batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub received: usize,
    pub written: usize,
    pub rejected: usize,
    /// Snapshot version after the batch
    pub version: u64,
    pub reloaded: bool,
    pub timestamp: i64,
    pub files: Vec<UploadOutcome>,
}

impl UploadResponse {
    pub fn from_result(result: UploadResult) -> Self {
        let written = result.outcomes.iter().filter(|o| o.is_written()).count();
        let received = result.outcomes.len();

        Self {
            success: written == received,
            received,
            written,
            rejected: received - written,
            version: result.snapshot.version,
            reloaded: result.reloaded,
            timestamp: Utc::now().timestamp_millis(),
            files: result.outcomes,
        }
    }
}

/// Loaded table summary.
#[derive(Debug, Serialize, Deserialize)]
pub struct TablesResponse {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub rows: BTreeMap<TableKind, usize>,
    pub files: Vec<TableLoad>,
    pub archives: Vec<ArchiveOutcome>,
}

impl From<&Snapshot> for TablesResponse {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version,
            loaded_at: snapshot.loaded_at,
            rows: snapshot.tables.row_counts(),
            files: snapshot.load.files.clone(),
            archives: snapshot.archives.clone(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub data_dir_ready: bool,
    pub tables_loaded: bool,
    pub snapshot_version: u64,
    pub components: Vec<ComponentHealthReport>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type carrying a stable error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_001", msg)
    }

    pub fn validation(code: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new("Validation failed", code).with_details(errors),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<dashboard_core::Error> for ApiError {
    fn from(err: dashboard_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::with_code(status, err.code(), err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::validation("VALID_001", vec![errors.to_string()])
    }
}
