//! Table definitions for the search console export.
//!
//! Six flat files make up an export. Each is loaded independently; nothing
//! ties a device row to a date row.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Clicks column shared by every ranked table.
pub const CLICKS_COLUMN: &str = "Clicks";

/// Impressions column of the Dates table.
pub const IMPRESSIONS_COLUMN: &str = "Impressions";

/// Calendar date column.
pub const DATE_COLUMN: &str = "Date";

/// The six tables of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Dates,
    Devices,
    Countries,
    Queries,
    Pages,
    Filters,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        Self::Countries,
        Self::Dates,
        Self::Devices,
        Self::Filters,
        Self::Pages,
        Self::Queries,
    ];

    /// File name inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Dates => "Dates.csv",
            Self::Devices => "Devices.csv",
            Self::Countries => "Countries.csv",
            Self::Queries => "Queries.csv",
            Self::Pages => "Pages.csv",
            Self::Filters => "Filters.csv",
        }
    }

    /// Column that names the category for ranked tables.
    pub fn category_column(&self) -> Option<&'static str> {
        match self {
            Self::Devices => Some("Device"),
            Self::Countries => Some("Country"),
            Self::Queries => Some("Top queries"),
            Self::Pages => Some("Top pages"),
            Self::Dates | Self::Filters => None,
        }
    }

    /// Match an export file name, ignoring ASCII case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.file_name().eq_ignore_ascii_case(name))
    }
}

/// One row of the Dates table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRow {
    pub date: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
}

/// One row of a ranked table (devices, countries, queries, pages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category: String,
    pub clicks: u64,
    /// Only set when the file carries a `Date` column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl CategoryRow {
    pub fn new(category: impl Into<String>, clicks: u64) -> Self {
        Self {
            category: category.into(),
            clicks,
            date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// A table kept as plain text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Rows read from one table file.
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    Dates(Vec<DateRow>),
    Categories(Vec<CategoryRow>),
    Raw(RawTable),
}

impl TableData {
    pub fn len(&self) -> usize {
        match self {
            Self::Dates(rows) => rows.len(),
            Self::Categories(rows) => rows.len(),
            Self::Raw(table) => table.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All tables of an export held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub dates: Vec<DateRow>,
    pub devices: Vec<CategoryRow>,
    pub countries: Vec<CategoryRow>,
    pub queries: Vec<CategoryRow>,
    pub pages: Vec<CategoryRow>,
    pub filters: RawTable,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a table wholesale. Data of the wrong shape for `kind` is dropped.
    pub fn replace(&mut self, kind: TableKind, data: TableData) {
        match (kind, data) {
            (TableKind::Dates, TableData::Dates(rows)) => self.dates = rows,
            (TableKind::Filters, TableData::Raw(table)) => self.filters = table,
            (kind, TableData::Categories(rows)) => {
                if let Some(slot) = self.category_slot(kind) {
                    *slot = rows;
                }
            }
            _ => {}
        }
    }

    /// Rows of a ranked table; empty for Dates and Filters.
    pub fn categories(&self, kind: TableKind) -> &[CategoryRow] {
        match kind {
            TableKind::Devices => &self.devices,
            TableKind::Countries => &self.countries,
            TableKind::Queries => &self.queries,
            TableKind::Pages => &self.pages,
            TableKind::Dates | TableKind::Filters => &[],
        }
    }

    fn category_slot(&mut self, kind: TableKind) -> Option<&mut Vec<CategoryRow>> {
        match kind {
            TableKind::Devices => Some(&mut self.devices),
            TableKind::Countries => Some(&mut self.countries),
            TableKind::Queries => Some(&mut self.queries),
            TableKind::Pages => Some(&mut self.pages),
            TableKind::Dates | TableKind::Filters => None,
        }
    }

    pub fn row_count(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Dates => self.dates.len(),
            TableKind::Filters => self.filters.rows.len(),
            kind => self.categories(kind).len(),
        }
    }

    pub fn row_counts(&self) -> BTreeMap<TableKind, usize> {
        TableKind::ALL
            .into_iter()
            .map(|kind| (kind, self.row_count(kind)))
            .collect()
    }

    pub fn total_rows(&self) -> usize {
        TableKind::ALL.iter().map(|kind| self.row_count(*kind)).sum()
    }
}

/// Parse a click or impression cell.
///
/// Accepts thousands separators and whole-valued decimals (`"1,234"`,
/// `"12.0"`). An empty cell counts as zero.
pub fn parse_count(cell: &str) -> Option<u64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    if cleaned.is_empty() {
        return Some(0);
    }

    if let Ok(n) = cleaned.parse::<u64>() {
        return Some(n);
    }

    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Some(f as u64)
        }
        _ => None,
    }
}
