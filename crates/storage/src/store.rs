//! Versioned snapshots of the loaded tables.
//!
//! Readers grab an `Arc<Snapshot>` and never see a half-replaced table.
//! Writers (uploads, reloads) are serialized and publish a whole new
//! snapshot when they finish.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashboard_core::{Result, Tables, UploadBatch, UploadOutcome};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use telemetry::{health, metrics, HealthRegistry};
use tracing::{error, info, warn};

use crate::archive::{expand_archives_in, ArchiveOutcome};
use crate::config::StorageConfig;
use crate::loader::{load_tables, LoadReport};
use crate::upload::apply_batch;

/// Tables as loaded at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip)]
    pub tables: Tables,
    pub load: LoadReport,
    /// Archives expanded before this load; empty after an upload.
    pub archives: Vec<ArchiveOutcome>,
}

/// Outcome of an upload batch.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub outcomes: Vec<UploadOutcome>,
    /// Snapshot current after the batch.
    pub snapshot: Arc<Snapshot>,
    /// True when at least one file was written and tables were reloaded.
    pub reloaded: bool,
}

/// Owner of the data directory and the current snapshot.
pub struct DataStore {
    config: StorageConfig,
    health: &'static HealthRegistry,
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl DataStore {
    /// Open the data directory, creating it if needed, then expand archives
    /// (if configured) and load every table.
    pub fn open(config: StorageConfig) -> Result<Self> {
        Self::open_with_health(config, health())
    }

    /// Like `open`, reporting component health to `registry`.
    pub fn open_with_health(config: StorageConfig, registry: &'static HealthRegistry) -> Result<Self> {
        let dir = config.data_dir.as_path();
        if let Err(e) = fs::create_dir_all(dir) {
            error!(path = %dir.display(), error = %e, "Data directory unavailable");
            registry.data_dir.set_unhealthy(e.to_string());
            return Err(e.into());
        }
        registry.data_dir.set_healthy();
        info!(path = %dir.display(), "Opened data directory");

        let snapshot = build_snapshot(dir, 1, config.expand_archives, registry)?;
        Ok(Self {
            config,
            health: registry,
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Expand archives (if configured) and reload every table.
    pub fn reload(&self) -> Result<Arc<Snapshot>> {
        let _guard = self.writer.lock();
        let version = self.snapshot().version + 1;
        let snapshot = build_snapshot(self.dir(), version, self.config.expand_archives, self.health)?;
        Ok(self.publish(snapshot))
    }

    /// Write a batch of uploaded files and reload tables if any landed.
    ///
    /// Archives in the batch are expanded as they are written; archives
    /// already in the directory are left alone.
    pub fn upload(&self, batch: &UploadBatch) -> Result<UploadResult> {
        let _guard = self.writer.lock();
        let start = Instant::now();
        metrics().upload_batches.inc();

        let outcomes = apply_batch(self.dir(), batch);
        let written = outcomes.iter().filter(|o| o.is_written()).count();

        let (snapshot, reloaded) = if written > 0 {
            let version = self.snapshot().version + 1;
            let snapshot = build_snapshot(self.dir(), version, false, self.health)?;
            (self.publish(snapshot), true)
        } else {
            (self.snapshot(), false)
        };

        metrics()
            .upload_latency_ms
            .observe(start.elapsed().as_millis() as u64);
        info!(
            files = outcomes.len(),
            written,
            rejected = outcomes.len() - written,
            version = snapshot.version,
            "Upload batch processed"
        );

        Ok(UploadResult {
            outcomes,
            snapshot,
            reloaded,
        })
    }

    fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = snapshot.clone();
        snapshot
    }
}

fn build_snapshot(
    dir: &Path,
    version: u64,
    expand_archives: bool,
    registry: &HealthRegistry,
) -> Result<Snapshot> {
    let start = Instant::now();

    let archives = if expand_archives {
        expand_archives_in(dir)?
    } else {
        Vec::new()
    };

    let (tables, load) = load_tables(dir);
    record_load(&tables, &load, version, registry);
    metrics()
        .reload_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    info!(
        version,
        rows = tables.total_rows(),
        archives = archives.len(),
        "Tables loaded"
    );

    Ok(Snapshot {
        version,
        loaded_at: Utc::now(),
        tables,
        load,
        archives,
    })
}

fn record_load(tables: &Tables, load: &LoadReport, version: u64, registry: &HealthRegistry) {
    metrics().reloads.inc();
    metrics().rows_loaded.set(tables.total_rows() as u64);
    metrics().snapshot_version.set(version);

    let failures: Vec<String> = load
        .failures()
        .map(|failed| failed.file.clone())
        .collect();

    if failures.is_empty() {
        registry.tables.set_healthy();
    } else {
        metrics().table_load_failures.inc_by(failures.len() as u64);
        warn!(files = ?failures, "Some tables failed to load");
        registry
            .tables
            .set_unhealthy(format!("failed to load: {}", failures.join(", ")));
    }
}
