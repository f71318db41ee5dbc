//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Data directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the export CSVs and archives
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Expand every `.zip` in the directory when opening and on reload
    #[serde(default = "default_expand_archives")]
    pub expand_archives: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_expand_archives() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            expand_archives: default_expand_archives(),
        }
    }
}

impl StorageConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }
}
