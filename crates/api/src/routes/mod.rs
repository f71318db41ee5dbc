//! API routes.

pub mod dashboard;
pub mod health;
pub mod tables;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/dashboard", get(dashboard::dashboard_handler))
        .route("/api/top", get(dashboard::top_handler))
        .route("/api/tables", get(tables::tables_handler))
        .route("/api/reload", post(tables::reload_handler))
        // Uploads carry whole exports; no body size cap.
        .route(
            "/api/upload",
            post(upload::upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
