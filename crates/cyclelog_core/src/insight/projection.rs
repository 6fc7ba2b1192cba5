//! List and chart projections for presentation callers.

use crate::ledger::view::LedgerView;
use crate::model::entry::Entry;
use chrono::NaiveDate;
use serde::Serialize;

/// Default number of rows in the "most recent" list.
pub const RECENT_DEFAULT_LIMIT: usize = 8;
/// Default number of points in the cycle-length chart.
pub const SERIES_DEFAULT_LIMIT: usize = 36;

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CyclePoint {
    pub date: NaiveDate,
    pub cycle_length: u32,
}

/// Chronological cycle lengths with their range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleSeries {
    pub points: Vec<CyclePoint>,
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl CycleSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}

/// Up to `limit` entries, most recent first.
pub fn recent_entries(view: &LedgerView, limit: usize) -> Vec<Entry> {
    view.descending().take(limit).cloned().collect()
}

/// The oldest `limit` entries that carry a cycle length, oldest first.
pub fn cycle_series(view: &LedgerView, limit: usize) -> CycleSeries {
    let points = view
        .ascending()
        .filter_map(|entry| {
            entry.cycle_length.map(|cycle_length| CyclePoint {
                date: entry.date,
                cycle_length,
            })
        })
        .take(limit)
        .collect::<Vec<_>>();

    CycleSeries {
        min: points.iter().map(|point| point.cycle_length).min(),
        max: points.iter().map(|point| point.cycle_length).max(),
        points,
    }
}
