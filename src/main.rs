//! Search Console Dashboard Service
//!
//! Serves a single-page analytics dashboard over search-performance exports:
//! - Loads the export CSVs (and expands ZIP exports) from a data directory
//! - Answers date-range totals, daily series, weekday split and top-N rankings
//! - Accepts CSV and ZIP uploads that replace tables wholesale

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use api::{router, AppState, DashboardSettings};
use dashboard_core::{
    limits::{DEFAULT_RANGE_END, DEFAULT_RANGE_START, TOP_N},
    CategoryScope, DateRange, ReportOptions,
};
use datastore::{DataStore, StorageConfig};
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Directory holding the export CSVs
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_expand_archives")]
    expand_archives: bool,

    /// Range served when a query omits `start`/`end`
    #[serde(default = "default_start")]
    default_start: String,
    #[serde(default = "default_end")]
    default_end: String,

    #[serde(default = "default_top_n")]
    top_n: usize,
    #[serde(default)]
    category_scope: CategoryScope,

    #[serde(default = "default_report_cache_capacity")]
    report_cache_capacity: u64,
    #[serde(default = "default_report_cache_ttl_secs")]
    report_cache_ttl_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    StorageConfig::default().data_dir
}

fn default_expand_archives() -> bool {
    true
}

fn default_start() -> String {
    DEFAULT_RANGE_START.to_string()
}

fn default_end() -> String {
    DEFAULT_RANGE_END.to_string()
}

fn default_top_n() -> usize {
    TOP_N
}

fn default_report_cache_capacity() -> u64 {
    api::state::REPORT_CACHE_MAX_CAPACITY
}

fn default_report_cache_ttl_secs() -> u64 {
    api::state::REPORT_CACHE_TTL.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            expand_archives: default_expand_archives(),
            default_start: default_start(),
            default_end: default_end(),
            top_n: default_top_n(),
            category_scope: CategoryScope::default(),
            report_cache_capacity: default_report_cache_capacity(),
            report_cache_ttl_secs: default_report_cache_ttl_secs(),
        }
    }
}

impl Config {
    fn storage(&self) -> StorageConfig {
        StorageConfig {
            data_dir: self.data_dir.clone(),
            expand_archives: self.expand_archives,
        }
    }

    fn settings(&self) -> Result<DashboardSettings> {
        let range = DateRange::parse(&self.default_start, &self.default_end)
            .context("Invalid default date range")?;
        let report = ReportOptions {
            top_n: self.top_n,
            category_scope: self.category_scope,
        };

        Ok(DashboardSettings::new(range, report).with_cache(
            self.report_cache_capacity,
            Duration::from_secs(self.report_cache_ttl_secs),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Search Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let settings = config.settings()?;

    info!(
        data_dir = %config.data_dir.display(),
        start = %settings.default_range.start,
        end = %settings.default_range.end,
        top_n = settings.report.top_n,
        "Loaded config"
    );

    // Open the data directory and load every table
    let storage = config.storage();
    let store = tokio::task::spawn_blocking(move || DataStore::open(storage))
        .await
        .context("Startup load task failed")?
        .context("Failed to open data directory")?;

    let snapshot = store.snapshot();
    for failed in snapshot.load.failures() {
        warn!(file = %failed.file, "Table not loaded at startup");
    }

    let state = AppState::new(Arc::new(store), settings);
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Defaults layered under every other source.
fn base_config() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder().add_source(config::Config::try_from(&Config::default())?))
}

fn build_config(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Config> {
    builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let builder = base_config()?
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("DASHBOARD")
                .try_parsing(true),
        );

    let mut config = build_config(builder)?;

    // Flat overrides; the config crate splits underscored names on `__` only
    if let Ok(data_dir) = std::env::var("DASHBOARD_DATA_DIR") {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Ok(port) = std::env::var("DASHBOARD_PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("Invalid DASHBOARD_PORT: {}", port))?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
