//! Data directory access for the search dashboard.
//!
//! Reads the export CSVs, expands ZIP archives in place, writes uploaded
//! files, and publishes loaded tables as versioned snapshots.

pub mod archive;
pub mod config;
pub mod loader;
pub mod store;
pub mod upload;

pub use config::StorageConfig;
pub use loader::{load_table, load_tables, LoadOutcome, LoadReport, TableLoad};
pub use store::{DataStore, Snapshot, UploadResult};
