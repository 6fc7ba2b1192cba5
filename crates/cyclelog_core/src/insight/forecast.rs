//! Next-entry forecast from an adaptive outlier band.
//!
//! The band starts at `[FORECAST_PRIOR_DAYS, FORECAST_PRIOR_DAYS]` and widens
//! only toward values that fall within `FORECAST_BAND_DAYS` of its edges.
//! Values outside the widened band do not contribute to the average.

use crate::ledger::view::LedgerView;
use crate::time::{add_days, days_from};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Neutral prior for both band edges, in days.
pub const FORECAST_PRIOR_DAYS: i64 = 28;
/// Distance beyond a band edge a value may sit and still count.
pub const FORECAST_BAND_DAYS: i64 = 10;

/// Projected next entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// `most_recent.date + robust_average`.
    pub expected_date: NaiveDate,
    /// Whole days from today; negative when overdue.
    pub days_until: i64,
    /// Outlier-bounded mean cycle length, floored.
    pub robust_average: u32,
}

impl Forecast {
    pub fn is_overdue(&self) -> bool {
        self.days_until < 0
    }
}

/// Floored mean of the cycle lengths inside the adaptive band.
///
/// Scans most recent first; a missing cycle length counts as 0. Returns
/// `None` when no value survives the band.
pub fn robust_average(view: &LedgerView) -> Option<u32> {
    let mut high = FORECAST_PRIOR_DAYS;
    let mut low = FORECAST_PRIOR_DAYS;
    let mut sum: i64 = 0;
    let mut count: i64 = 0;

    for entry in view.descending() {
        let value = i64::from(entry.cycle_length.unwrap_or(0));
        if value > high && value < high + FORECAST_BAND_DAYS {
            high = value;
        }
        if value < low && value > low - FORECAST_BAND_DAYS {
            low = value;
        }
        if value > low - FORECAST_BAND_DAYS && value < high + FORECAST_BAND_DAYS {
            sum += value;
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    u32::try_from(sum.div_euclid(count)).ok()
}

/// Forecasts the next entry relative to `today`.
///
/// Returns `None` with fewer than two entries or no in-band cycle length.
pub fn forecast_next(view: &LedgerView, today: NaiveDate) -> Option<Forecast> {
    if view.len() < 2 {
        return None;
    }
    let most_recent = view.most_recent()?;
    let robust_average = robust_average(view)?;
    let expected_date = add_days(most_recent.date, robust_average);

    Some(Forecast {
        expected_date,
        days_until: days_from(today, expected_date),
        robust_average,
    })
}

#[cfg(test)]
mod tests {
    use super::{forecast_next, robust_average};
    use crate::ledger::view::LedgerView;
    use crate::model::entry::Entry;
    use chrono::{Duration, NaiveDate, Utc};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn ledger(offsets: &[i64]) -> LedgerView {
        let mut previous: Option<i64> = None;
        let entries = offsets
            .iter()
            .map(|offset| {
                let mut entry = Entry::new(day(*offset), None, Utc::now());
                entry.cycle_length = previous.map(|p| (offset - p) as u32);
                previous = Some(*offset);
                entry
            })
            .collect();
        LedgerView::new(entries)
    }

    #[test]
    fn fewer_than_two_entries_is_undefined() {
        assert!(forecast_next(&LedgerView::default(), day(0)).is_none());
        assert!(forecast_next(&ledger(&[0]), day(3)).is_none());
    }

    #[test]
    fn outliers_are_excluded_from_the_average() {
        // cycles (newest first): 58, 2, 30, null
        let view = ledger(&[0, 30, 32, 90]);
        assert_eq!(robust_average(&view), Some(30));

        let forecast = forecast_next(&view, day(100)).unwrap();
        assert_eq!(forecast.expected_date, day(120));
        assert_eq!(forecast.days_until, 20);
    }

    #[test]
    fn band_grows_toward_moderate_values() {
        // cycles (newest first): 35, 32, 29, 26, null(0)
        let view = ledger(&[0, 26, 55, 87, 122]);
        // 35 is accepted by the initial band, 26 lowers `low`; the leading
        // null counts as 0 and stays outside.
        assert_eq!(robust_average(&view), Some((35 + 32 + 29 + 26) / 4));
    }

    #[test]
    fn past_expected_date_is_overdue() {
        let view = ledger(&[0, 28]);
        let forecast = forecast_next(&view, day(60)).unwrap();
        assert_eq!(forecast.expected_date, day(56));
        assert_eq!(forecast.days_until, -4);
        assert!(forecast.is_overdue());
    }

    #[test]
    fn all_values_out_of_band_is_undefined() {
        // cycles: 90, null(0)
        let view = ledger(&[0, 90]);
        assert_eq!(robust_average(&view), None);
        assert!(forecast_next(&view, day(95)).is_none());
    }
}
