//! Upload endpoint handler.
//!
//! Accepts `{ "files": [{ "filename": "...", "content": "..." }] }` where
//! `content` is base64, optionally as a `data:` URI. Each file is written
//! (or rejected) on its own; tables are reloaded once afterwards.

use axum::{body::Bytes, extract::State, Json};
use dashboard_core::UploadBatch;
use tracing::{debug, error};
use validator::Validate;

use crate::response::{ApiError, UploadResponse};
use crate::state::AppState;

/// POST /api/upload - Write CSV and ZIP exports into the data directory.
pub async fn upload_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    debug!(payload_size = body.len(), "Received upload batch");

    let batch: UploadBatch = serde_json::from_slice(&body).map_err(|e| {
        error!("Failed to parse upload payload: {}", e);
        ApiError::bad_request(e.to_string())
    })?;
    batch.validate()?;

    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.upload(&batch))
        .await
        .map_err(|e| {
            error!("Upload task failed: {}", e);
            ApiError::internal("Upload failed")
        })??;

    if result.reloaded {
        state.reports.clear();
    }

    Ok(Json(UploadResponse::from_result(result)))
}
