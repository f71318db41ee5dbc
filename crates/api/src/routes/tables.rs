//! Loaded table inspection and reload.

use axum::{extract::State, Json};
use tracing::{error, info};

use crate::response::{ApiError, TablesResponse};
use crate::state::AppState;

/// GET /api/tables - Row counts and per-file load outcomes.
pub async fn tables_handler(State(state): State<AppState>) -> Json<TablesResponse> {
    Json(TablesResponse::from(state.store.snapshot().as_ref()))
}

/// POST /api/reload - Re-read the data directory.
pub async fn reload_handler(
    State(state): State<AppState>,
) -> Result<Json<TablesResponse>, ApiError> {
    let store = state.store.clone();
    let snapshot = tokio::task::spawn_blocking(move || store.reload())
        .await
        .map_err(|e| {
            error!("Reload task failed: {}", e);
            ApiError::internal("Reload failed")
        })??;

    state.reports.clear();
    info!(version = snapshot.version, "Reloaded tables");

    Ok(Json(TablesResponse::from(snapshot.as_ref())))
}
