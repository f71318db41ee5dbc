//! HTTP API layer for the search dashboard.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, DashboardSettings};
