//! Fixed sizes and defaults for the dashboard.
//!
//! These mirror what the dashboard shows: a top-5 ranking for countries,
//! queries and pages, and a calendar-year date picker.

/// Entries kept by the country, query and page rankings.
pub const TOP_N: usize = 5;

/// Start of the date range used when a query omits one.
pub const DEFAULT_RANGE_START: &str = "2024-01-01";

/// End of the date range used when a query omits one.
pub const DEFAULT_RANGE_END: &str = "2024-12-31";

/// Longest accepted upload file name, in bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;
