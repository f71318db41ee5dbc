//! Writing uploaded files into the data directory.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dashboard_core::{
    check_file_name, Error, Result, TableKind, UploadBatch, UploadFile, UploadKind, UploadOutcome,
};
use telemetry::metrics;
use tracing::{info, warn};

use crate::archive::expand_archive;

/// Marker between the media type and the payload of a data URI.
const BASE64_MARKER: &str = ";base64,";

/// Decode upload content, with or without a `data:` URI prefix.
pub fn decode_content(filename: &str, content: &str) -> Result<Vec<u8>> {
    let payload = match content.find(BASE64_MARKER) {
        Some(pos) => &content[pos + BASE64_MARKER.len()..],
        None => content,
    };

    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| Error::invalid_payload(filename, e))
}

/// Write one uploaded file, expanding it if it is an archive.
///
/// A CSV named like an export table (in any case) is stored under the
/// table's file name. An archive that fails to expand is removed again.
/// Returns the kind, the byte count written, and any archive members.
pub fn write_upload(dir: &Path, file: &UploadFile) -> Result<(UploadKind, usize, Vec<String>)> {
    let name = check_file_name(&file.filename)?;
    let kind = UploadKind::from_file_name(name)?;
    let bytes = decode_content(name, &file.content)?;

    let path = dir.join(stored_name(kind, name));
    fs::write(&path, &bytes)?;

    let extracted = match kind {
        UploadKind::Csv => Vec::new(),
        UploadKind::Zip => match expand_archive(&path, dir) {
            Ok(extracted) => extracted,
            Err(e) => {
                metrics().archive_failures.inc();
                if let Err(remove_err) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %remove_err, "Failed to remove broken archive");
                }
                return Err(e);
            }
        },
    };

    Ok((kind, bytes.len(), extracted))
}

/// File name an upload is stored under.
pub fn stored_name(kind: UploadKind, name: &str) -> &str {
    match (kind, TableKind::from_file_name(name)) {
        (UploadKind::Csv, Some(table)) => table.file_name(),
        _ => name,
    }
}

/// Apply every file of a batch. A failing file never stops the others.
pub fn apply_batch(dir: &Path, batch: &UploadBatch) -> Vec<UploadOutcome> {
    batch
        .files
        .iter()
        .map(|file| match write_upload(dir, file) {
            Ok((kind, bytes, extracted)) => {
                metrics().files_written.inc();
                info!(
                    filename = %file.filename,
                    kind = ?kind,
                    bytes,
                    extracted = extracted.len(),
                    "Wrote uploaded file"
                );
                UploadOutcome::written(&file.filename, kind, bytes, extracted)
            }
            Err(e) => {
                metrics().files_rejected.inc();
                warn!(filename = %file.filename, code = e.code(), error = %e, "Rejected uploaded file");
                UploadOutcome::rejected(&file.filename, &e)
            }
        })
        .collect()
}
