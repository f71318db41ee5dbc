//! CSV table loading.
//!
//! Each expected file is read on its own. A missing file yields an empty
//! table; a broken file yields an empty table plus a failure in the report.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use dashboard_core::{
    parse_count, parse_date, CategoryRow, DateRow, Error, RawTable, Result, TableData, TableKind,
    Tables, CLICKS_COLUMN, DATE_COLUMN, IMPRESSIONS_COLUMN,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of loading one table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { rows: usize },
    Missing,
    Failed { code: String, error: String },
}

/// Load result for one expected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLoad {
    pub table: TableKind,
    pub file: String,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

/// Per-file results of loading a data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub files: Vec<TableLoad>,
}

impl LoadReport {
    pub fn outcome(&self, kind: TableKind) -> Option<&LoadOutcome> {
        self.files
            .iter()
            .find(|load| load.table == kind)
            .map(|load| &load.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableLoad> {
        self.files
            .iter()
            .filter(|load| matches!(load.outcome, LoadOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Load one expected table from `dir`.
///
/// Fails with `MissingFile` when the file is absent.
pub fn load_table(dir: &Path, kind: TableKind) -> Result<TableData> {
    let path = dir.join(kind.file_name());
    if !path.is_file() {
        return Err(Error::missing_file(&path));
    }

    match kind.category_column() {
        Some(column) => read_category_rows(&path, column).map(TableData::Categories),
        None if kind == TableKind::Dates => read_date_rows(&path).map(TableData::Dates),
        None => read_raw_table(&path).map(TableData::Raw),
    }
}

/// Load every expected table from `dir`. Never fails as a whole.
pub fn load_tables(dir: &Path) -> (Tables, LoadReport) {
    let mut tables = Tables::new();
    let mut report = LoadReport::default();

    for kind in TableKind::ALL {
        let outcome = match load_table(dir, kind) {
            Ok(data) => {
                let rows = data.len();
                info!(table = ?kind, rows, "Loaded table");
                tables.replace(kind, data);
                LoadOutcome::Loaded { rows }
            }
            Err(Error::MissingFile(path)) => {
                debug!(table = ?kind, path = %path, "Table file not present");
                LoadOutcome::Missing
            }
            Err(e) => {
                warn!(table = ?kind, error = %e, "Failed to load table");
                LoadOutcome::Failed {
                    code: e.code().to_string(),
                    error: e.to_string(),
                }
            }
        };

        report.files.push(TableLoad {
            table: kind,
            file: kind.file_name().to_string(),
            outcome,
        });
    }

    (tables, report)
}

/// Read `Date`, `Clicks` and `Impressions` rows.
pub fn read_date_rows(path: &Path) -> Result<Vec<DateRow>> {
    let mut table = CsvTable::open(path)?;
    let date_idx = table.column(DATE_COLUMN)?;
    let clicks_idx = table.column(CLICKS_COLUMN)?;
    let impressions_idx = table.column(IMPRESSIONS_COLUMN)?;

    let mut rows = Vec::new();
    while let Some(record) = table.next_record()? {
        rows.push(DateRow {
            date: parse_date(cell(&record, date_idx))?,
            clicks: table.count(&record, clicks_idx, CLICKS_COLUMN)?,
            impressions: table.count(&record, impressions_idx, IMPRESSIONS_COLUMN)?,
        });
    }

    Ok(rows)
}

/// Read category and click rows, plus the date when the file has one.
pub fn read_category_rows(path: &Path, category_column: &str) -> Result<Vec<CategoryRow>> {
    let mut table = CsvTable::open(path)?;
    let category_idx = table.column(category_column)?;
    let clicks_idx = table.column(CLICKS_COLUMN)?;
    let date_idx = table.optional_column(DATE_COLUMN);

    let mut rows = Vec::new();
    while let Some(record) = table.next_record()? {
        let date = match date_idx.map(|idx| cell(&record, idx)) {
            Some(value) if !value.is_empty() => Some(parse_date(value)?),
            _ => None,
        };

        rows.push(CategoryRow {
            category: cell(&record, category_idx).to_string(),
            clicks: table.count(&record, clicks_idx, CLICKS_COLUMN)?,
            date,
        });
    }

    Ok(rows)
}

/// Read a file as plain text cells.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let mut table = CsvTable::open(path)?;
    let mut rows = Vec::new();
    while let Some(record) = table.next_record()? {
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable {
        headers: table.headers,
        rows,
    })
}

/// A CSV file with its header already read.
struct CsvTable<'a> {
    path: &'a Path,
    headers: Vec<String>,
    reader: csv::Reader<File>,
}

impl<'a> CsvTable<'a> {
    fn open(path: &'a Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| Error::csv(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| Error::csv(path, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        Ok(Self {
            path,
            headers,
            reader,
        })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name)
            .ok_or_else(|| Error::missing_column(self.path, name))
    }

    /// Next non-blank record.
    fn next_record(&mut self) -> Result<Option<StringRecord>> {
        let mut record = StringRecord::new();
        loop {
            let more = self
                .reader
                .read_record(&mut record)
                .map_err(|e| Error::csv(self.path, e))?;
            if !more {
                return Ok(None);
            }
            if record.iter().any(|value| !value.is_empty()) {
                return Ok(Some(record));
            }
        }
    }

    fn count(&self, record: &StringRecord, idx: usize, column: &str) -> Result<u64> {
        let value = cell(record, idx);
        parse_count(value).ok_or_else(|| Error::invalid_number(self.path, column, value))
    }
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}
