//! Aggregations behind the dashboard charts.
//!
//! Nothing here fails: an empty table or an empty range produces zero
//! totals and empty series.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::dates::{weekday_name, DateRange};
use crate::tables::{CategoryRow, DateRow};

/// Summed clicks and impressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub clicks: u64,
    pub impressions: u64,
}

/// One point of the clicks/impressions time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
}

/// Clicks summed per day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayClicks {
    pub day: String,
    pub clicks: u64,
}

/// Clicks summed per category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryClicks {
    pub category: String,
    pub clicks: u64,
}

/// Everything derived from the Dates table for one range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeSummary {
    pub totals: Totals,
    /// Ascending by date, one point per distinct date.
    pub series: Vec<DailyPoint>,
    /// Monday first; only days that occur in the range.
    pub weekdays: Vec<WeekdayClicks>,
}

/// Which rows the category rankings consider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScope {
    /// Whole table, whatever the selected range.
    #[default]
    All,
    /// Rows dated outside the range are dropped; undated rows are kept.
    DateRange,
}

impl CategoryScope {
    pub fn includes(&self, row: &CategoryRow, range: &DateRange) -> bool {
        match self {
            Self::All => true,
            Self::DateRange => row.date.map_or(true, |date| range.contains(date)),
        }
    }

    /// Rows of a ranked table this scope keeps for `range`.
    pub fn select<'a>(
        self,
        rows: &'a [CategoryRow],
        range: DateRange,
    ) -> impl Iterator<Item = &'a CategoryRow> + 'a {
        rows.iter().filter(move |row| self.includes(row, &range))
    }
}

/// Sum the Dates table over an inclusive range. Sums saturate at `u64::MAX`.
pub fn summarize_dates(rows: &[DateRow], range: &DateRange) -> DateRangeSummary {
    if range.is_empty() {
        return DateRangeSummary::default();
    }

    let mut per_day: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    let mut per_weekday: [Option<u64>; 7] = [None; 7];

    for row in rows.iter().filter(|row| range.contains(row.date)) {
        let day = per_day.entry(row.date).or_default();
        day.clicks = day.clicks.saturating_add(row.clicks);
        day.impressions = day.impressions.saturating_add(row.impressions);

        let slot = &mut per_weekday[row.date.weekday().num_days_from_monday() as usize];
        *slot = Some(slot.unwrap_or(0).saturating_add(row.clicks));
    }

    let series: Vec<DailyPoint> = per_day
        .into_iter()
        .map(|(date, totals)| DailyPoint {
            date,
            clicks: totals.clicks,
            impressions: totals.impressions,
        })
        .collect();

    let totals = series.iter().fold(Totals::default(), |acc, point| Totals {
        clicks: acc.clicks.saturating_add(point.clicks),
        impressions: acc.impressions.saturating_add(point.impressions),
    });

    let weekdays = WEEK
        .iter()
        .zip(per_weekday)
        .filter_map(|(weekday, clicks)| {
            clicks.map(|clicks| WeekdayClicks {
                day: weekday_name(*weekday).to_string(),
                clicks,
            })
        })
        .collect();

    DateRangeSummary {
        totals,
        series,
        weekdays,
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Group rows by category, sum clicks, and order by descending sum.
/// Sums saturate at `u64::MAX`.
///
/// Equal sums are ordered by category name. `limit` keeps only the first
/// entries; `None` keeps every group.
pub fn rank_categories<'a, I>(rows: I, limit: Option<usize>) -> Vec<CategoryClicks>
where
    I: IntoIterator<Item = &'a CategoryRow>,
{
    let mut sums: HashMap<&'a str, u64> = HashMap::new();
    for row in rows {
        let sum = sums.entry(row.category.as_str()).or_insert(0);
        *sum = sum.saturating_add(row.clicks);
    }

    let mut ranked: Vec<CategoryClicks> = sums
        .into_iter()
        .map(|(category, clicks)| CategoryClicks {
            category: category.to_string(),
            clicks,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.clicks
            .cmp(&a.clicks)
            .then_with(|| a.category.cmp(&b.category))
    });

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    ranked
}
