//! Internal metrics collection.
//!
//! In-memory only; `GET /metrics` serves a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (set to the latest value).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug, Default)]
pub struct Histogram {
    /// Upper bounds in ms: 1, 5, 10, 25, 50, 100, 250, 500, 1000, then overflow
    buckets: [AtomicU64; 10],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 9] = [1, 5, 10, 25, 50, 100, 250, 500, 1000];

    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Bucket counts by upper bound; the last bucket has no bound.
    pub fn buckets(&self) -> Vec<LatencyBucket> {
        self.buckets
            .iter()
            .enumerate()
            .map(|(i, count)| LatencyBucket {
                le_ms: Self::BUCKET_BOUNDS.get(i).copied(),
                count: count.load(Ordering::Relaxed),
            })
            .collect()
    }
}

/// One histogram bucket: observations at or below `le_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub le_ms: Option<u64>,
    pub count: u64,
}

/// Collected metrics for the dashboard.
#[derive(Debug, Default)]
pub struct Metrics {
    // Query metrics
    pub reports_served: Counter,
    pub report_cache_hits: Counter,
    pub top_tables_served: Counter,
    pub invalid_queries: Counter,

    // Upload metrics
    pub upload_batches: Counter,
    pub files_written: Counter,
    pub files_rejected: Counter,
    pub archives_expanded: Counter,
    pub archive_failures: Counter,

    // Load metrics
    pub reloads: Counter,
    pub table_load_failures: Counter,

    // Latency histograms
    pub report_latency_ms: Histogram,
    pub upload_latency_ms: Histogram,
    pub reload_latency_ms: Histogram,

    // Gauges
    pub rows_loaded: Gauge,
    pub snapshot_version: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub reports_served: u64,
    pub report_cache_hits: u64,
    pub top_tables_served: u64,
    pub invalid_queries: u64,
    pub upload_batches: u64,
    pub files_written: u64,
    pub files_rejected: u64,
    pub archives_expanded: u64,
    pub archive_failures: u64,
    pub reloads: u64,
    pub table_load_failures: u64,
    pub report_latency_mean_ms: f64,
    pub upload_latency_mean_ms: f64,
    pub reload_latency_mean_ms: f64,
    pub report_latency_buckets: Vec<LatencyBucket>,
    pub upload_latency_buckets: Vec<LatencyBucket>,
    pub reload_latency_buckets: Vec<LatencyBucket>,
    pub rows_loaded: u64,
    pub snapshot_version: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            reports_served: self.reports_served.get(),
            report_cache_hits: self.report_cache_hits.get(),
            top_tables_served: self.top_tables_served.get(),
            invalid_queries: self.invalid_queries.get(),
            upload_batches: self.upload_batches.get(),
            files_written: self.files_written.get(),
            files_rejected: self.files_rejected.get(),
            archives_expanded: self.archives_expanded.get(),
            archive_failures: self.archive_failures.get(),
            reloads: self.reloads.get(),
            table_load_failures: self.table_load_failures.get(),
            report_latency_mean_ms: self.report_latency_ms.mean(),
            upload_latency_mean_ms: self.upload_latency_ms.mean(),
            reload_latency_mean_ms: self.reload_latency_ms.mean(),
            report_latency_buckets: self.report_latency_ms.buckets(),
            upload_latency_buckets: self.upload_latency_ms.buckets(),
            reload_latency_buckets: self.reload_latency_ms.buckets(),
            rows_loaded: self.rows_loaded.get(),
            snapshot_version: self.snapshot_version.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
