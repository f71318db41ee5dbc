//! Dashboard reports assembled from the loaded tables.

use serde::{Deserialize, Serialize};

use crate::aggregate::{
    rank_categories, summarize_dates, CategoryClicks, CategoryScope, DailyPoint, Totals,
    WeekdayClicks,
};
use crate::dates::DateRange;
use crate::limits::TOP_N;
use crate::tables::{TableKind, Tables};

/// Knobs for report assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Entries kept by the country, query and page rankings.
    pub top_n: usize,
    pub category_scope: CategoryScope,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: TOP_N,
            category_scope: CategoryScope::default(),
        }
    }
}

/// Everything the dashboard page shows for one date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub totals: Totals,
    pub series: Vec<DailyPoint>,
    pub weekdays: Vec<WeekdayClicks>,
    /// Every device, largest share first.
    pub devices: Vec<CategoryClicks>,
    pub countries: Vec<CategoryClicks>,
    pub top_queries: Vec<CategoryClicks>,
    pub top_pages: Vec<CategoryClicks>,
}

/// Query and page rankings over the whole tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTables {
    pub top_queries: Vec<CategoryClicks>,
    pub top_pages: Vec<CategoryClicks>,
}

/// Build the dashboard report for `range`.
pub fn build_report(tables: &Tables, range: DateRange, options: &ReportOptions) -> DashboardReport {
    let summary = summarize_dates(&tables.dates, &range);
    let scope = options.category_scope;
    let rank = |kind: TableKind, limit: Option<usize>| {
        rank_categories(scope.select(tables.categories(kind), range), limit)
    };

    DashboardReport {
        range,
        totals: summary.totals,
        series: summary.series,
        weekdays: summary.weekdays,
        devices: rank(TableKind::Devices, None),
        countries: rank(TableKind::Countries, Some(options.top_n)),
        top_queries: rank(TableKind::Queries, Some(options.top_n)),
        top_pages: rank(TableKind::Pages, Some(options.top_n)),
    }
}

/// Build the query and page rankings. These never look at a date range.
pub fn top_tables(tables: &Tables, options: &ReportOptions) -> TopTables {
    TopTables {
        top_queries: rank_categories(&tables.queries, Some(options.top_n)),
        top_pages: rank_categories(&tables.pages, Some(options.top_n)),
    }
}
