//! Unified error types for the dashboard.
//!
//! Error codes:
//! - FILE_001-003: Table file errors
//! - DATE_001: Date parsing errors
//! - UPLOAD_001-003: Upload errors
//! - ARCHIVE_001: Archive expansion errors
//! - IO_001, CSV_001, VALID_001, INTERNAL_001: Everything else

use std::path::Path;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the dashboard.
#[derive(Debug, Error)]
pub enum Error {
    /// An expected table file is not present in the data directory.
    #[error("missing file: {0}")]
    MissingFile(String),

    /// A required column is absent from a table file header.
    #[error("{file}: missing column {column:?}")]
    MissingColumn { file: String, column: String },

    /// A numeric cell could not be read as a count.
    #[error("{file}: invalid number {value:?} in column {column:?}")]
    InvalidNumber {
        file: String,
        column: String,
        value: String,
    },

    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),

    /// Uploaded file name does not end in `.csv` or `.zip`.
    #[error("unsupported upload extension: {0}")]
    UnsupportedUploadExtension(String),

    /// Uploaded content is not valid base64.
    #[error("invalid upload payload for {file}: {reason}")]
    InvalidPayload { file: String, reason: String },

    /// Uploaded file name would escape the data directory.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("failed to expand archive {archive}: {reason}")]
    ArchiveExpansionFailure { archive: String, reason: String },

    #[error("csv error in {file}: {reason}")]
    Csv { file: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn missing_file(path: impl AsRef<Path>) -> Self {
        Self::MissingFile(path.as_ref().display().to_string())
    }

    pub fn missing_column(file: impl AsRef<Path>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            file: file_label(file.as_ref()),
            column: column.into(),
        }
    }

    pub fn invalid_number(
        file: impl AsRef<Path>,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidNumber {
            file: file_label(file.as_ref()),
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn unparseable_date(input: impl Into<String>) -> Self {
        Self::UnparseableDate(input.into())
    }

    pub fn invalid_payload(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPayload {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    pub fn archive(archive: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::ArchiveExpansionFailure {
            archive: file_label(archive.as_ref()),
            reason: reason.to_string(),
        }
    }

    pub fn csv(file: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Csv {
            file: file_label(file.as_ref()),
            reason: reason.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the stable error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile(_) => "FILE_001",
            Self::MissingColumn { .. } => "FILE_002",
            Self::InvalidNumber { .. } => "FILE_003",
            Self::UnparseableDate(_) => "DATE_001",
            Self::UnsupportedUploadExtension(_) => "UPLOAD_001",
            Self::InvalidPayload { .. } => "UPLOAD_002",
            Self::InvalidFileName(_) => "UPLOAD_003",
            Self::ArchiveExpansionFailure { .. } => "ARCHIVE_001",
            Self::Csv { .. } => "CSV_001",
            Self::Io(_) => "IO_001",
            Self::Validation(_) => "VALID_001",
            Self::Internal(_) => "INTERNAL_001",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingFile(_) => 404,
            Self::UnparseableDate(_)
            | Self::UnsupportedUploadExtension(_)
            | Self::InvalidPayload { .. }
            | Self::InvalidFileName(_)
            | Self::Validation(_) => 400,
            Self::MissingColumn { .. }
            | Self::InvalidNumber { .. }
            | Self::ArchiveExpansionFailure { .. }
            | Self::Csv { .. } => 422,
            Self::Io(_) | Self::Internal(_) => 500,
        }
    }
}

/// Errors name files by their base name; the data directory is implied.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
