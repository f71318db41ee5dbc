//! Internal telemetry for the search dashboard.
//!
//! Health and metrics live in process-wide registries; tracing goes to
//! stdout through `tracing-subscriber`.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
