//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use dashboard_core::{build_report, DashboardReport, DateRange, ReportOptions};
use datastore::{DataStore, Snapshot};
use moka::future::Cache;
use telemetry::metrics;
use tracing::debug;

/// Default time a cached report stays valid.
pub const REPORT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default maximum cached reports.
pub const REPORT_CACHE_MAX_CAPACITY: u64 = 1_000;

/// Dashboard behaviour chosen at startup.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Range used when a query leaves out `start` or `end`
    pub default_range: DateRange,
    pub report: ReportOptions,
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
}

impl DashboardSettings {
    pub fn new(default_range: DateRange, report: ReportOptions) -> Self {
        Self {
            default_range,
            report,
            cache_capacity: REPORT_CACHE_MAX_CAPACITY,
            cache_ttl: REPORT_CACHE_TTL,
        }
    }

    pub fn with_cache(mut self, capacity: u64, ttl: Duration) -> Self {
        self.cache_capacity = capacity;
        self.cache_ttl = ttl;
        self
    }
}

/// Reports are keyed by snapshot version, so a reload never serves stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ReportKey {
    version: u64,
    range: DateRange,
}

/// Cache of built dashboard reports.
#[derive(Clone)]
pub struct ReportCache {
    cache: Cache<ReportKey, Arc<DashboardReport>>,
}

impl ReportCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the cached report for this snapshot and range, building it
    /// on a miss.
    pub async fn report(
        &self,
        snapshot: &Snapshot,
        range: DateRange,
        options: &ReportOptions,
    ) -> Arc<DashboardReport> {
        let key = ReportKey {
            version: snapshot.version,
            range,
        };

        if let Some(cached) = self.cache.get(&key).await {
            debug!(version = key.version, "Report cache hit");
            metrics().report_cache_hits.inc();
            return cached;
        }

        let report = Arc::new(build_report(&snapshot.tables, range, options));
        self.cache.insert(key, report.clone()).await;
        report
    }

    /// Drop every cached report.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Data directory and loaded tables
    pub store: Arc<DataStore>,
    pub settings: Arc<DashboardSettings>,
    pub reports: ReportCache,
}

impl AppState {
    pub fn new(store: Arc<DataStore>, settings: DashboardSettings) -> Self {
        Self {
            store,
            reports: ReportCache::new(settings.cache_capacity, settings.cache_ttl),
            settings: Arc::new(settings),
        }
    }
}
