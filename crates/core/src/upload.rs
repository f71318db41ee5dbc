//! Upload request and outcome types.
//!
//! An upload is a batch of named files whose content arrives base64
//! encoded, usually wrapped in a `data:` URI by the browser widget.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::limits::MAX_FILE_NAME_LEN;

/// One uploaded file. Its name is checked per file by `check_file_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFile {
    pub filename: String,
    /// Base64 payload, optionally prefixed `data:<mime>;base64,`.
    pub content: String,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// A batch of uploaded files, processed independently.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadBatch {
    #[validate(length(min = 1))]
    pub files: Vec<UploadFile>,
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Csv,
    Zip,
}

impl UploadKind {
    /// Classify by extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(Error::UnsupportedUploadExtension(name.to_string()))
        }
    }
}

/// Reject names that would land outside the data directory.
pub fn check_file_name(name: &str) -> Result<&str> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.len() > MAX_FILE_NAME_LEN;

    if invalid {
        Err(Error::InvalidFileName(name.to_string()))
    } else {
        Ok(name)
    }
}

/// What happened to one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Written {
        kind: UploadKind,
        bytes: usize,
        /// Archive members written next to the archive.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        extracted: Vec<String>,
    },
    Rejected {
        code: String,
        error: String,
    },
}

/// Per-file result of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub filename: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl UploadOutcome {
    pub fn written(filename: impl Into<String>, kind: UploadKind, bytes: usize, extracted: Vec<String>) -> Self {
        Self {
            filename: filename.into(),
            status: FileStatus::Written {
                kind,
                bytes,
                extracted,
            },
        }
    }

    pub fn rejected(filename: impl Into<String>, err: &Error) -> Self {
        Self {
            filename: filename.into(),
            status: FileStatus::Rejected {
                code: err.code().to_string(),
                error: err.to_string(),
            },
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self.status, FileStatus::Written { .. })
    }
}
