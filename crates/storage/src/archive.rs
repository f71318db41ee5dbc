//! ZIP archive expansion.
//!
//! Archives are expanded into the directory that holds them, overwriting
//! files of the same name. Entries whose path would escape the directory
//! are skipped.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use dashboard_core::{Error, Result, TableKind};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Result of expanding one archive found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub archive: String,
    pub extracted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Expand `archive` into `dest`, returning the written member paths
/// relative to `dest`.
///
/// Members are extracted into a staging directory first and only moved
/// into `dest` once the whole archive has been read, so a broken archive
/// leaves `dest` untouched. Top-level members named like an export table
/// (in any case) are stored under the table's file name.
pub fn expand_archive(archive: &Path, dest: &Path) -> Result<Vec<String>> {
    let staging = staging_dir(archive, dest);
    remove_staging(&staging);

    let result = extract_into(archive, &staging)
        .and_then(|members| publish_members(archive, &staging, dest, members));
    remove_staging(&staging);

    let extracted = result?;
    metrics().archives_expanded.inc();
    info!(archive = %archive.display(), files = extracted.len(), "Expanded archive");
    Ok(extracted)
}

fn extract_into(archive: &Path, staging: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive).map_err(|e| Error::archive(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| Error::archive(archive, e))?;

    let mut members = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| Error::archive(archive, e))?;

        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!(archive = %archive.display(), entry = entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        if entry.is_dir() {
            continue;
        }

        let out_path = staging.join(&relative);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::archive(archive, e))?;
        }

        let mut out = File::create(&out_path).map_err(|e| Error::archive(archive, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::archive(archive, e))?;

        debug!(archive = %archive.display(), entry = %relative.display(), "Extracted archive entry");
        members.push(relative);
    }

    Ok(members)
}

fn publish_members(
    archive: &Path,
    staging: &Path,
    dest: &Path,
    members: Vec<PathBuf>,
) -> Result<Vec<String>> {
    let mut published = Vec::with_capacity(members.len());
    for relative in members {
        let target = stored_path(&relative);
        let out_path = dest.join(&target);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::archive(archive, e))?;
        }
        fs::rename(staging.join(&relative), &out_path).map_err(|e| Error::archive(archive, e))?;
        published.push(relative_label(&target));
    }
    Ok(published)
}

/// Export tables at the archive root keep their canonical file name.
fn stored_path(relative: &Path) -> PathBuf {
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name
            .to_str()
            .and_then(TableKind::from_file_name)
            .map(|kind| PathBuf::from(kind.file_name()))
            .unwrap_or_else(|| relative.to_path_buf()),
        _ => relative.to_path_buf(),
    }
}

fn staging_dir(archive: &Path, dest: &Path) -> PathBuf {
    let name = archive.file_name().unwrap_or_default().to_string_lossy();
    dest.join(format!(".{}.expanding", name))
}

fn remove_staging(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %staging.display(), error = %e, "Failed to remove staging directory");
        }
    }
}

/// Expand every `.zip` in `dir`, in file name order.
pub fn expand_archives_in(dir: &Path) -> Result<Vec<ArchiveOutcome>> {
    let mut archives: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_zip(path))
        .collect();
    archives.sort();

    let outcomes = archives
        .iter()
        .map(|path| {
            let archive = relative_label(Path::new(path.file_name().unwrap_or_default()));
            match expand_archive(path, dir) {
                Ok(extracted) => ArchiveOutcome {
                    archive,
                    extracted,
                    error: None,
                },
                Err(e) => {
                    metrics().archive_failures.inc();
                    warn!(archive = %archive, error = %e, "Archive expansion failed");
                    ArchiveOutcome {
                        archive,
                        extracted: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    Ok(outcomes)
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Forward-slash path label, stable across platforms.
fn relative_label(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
