//! Display statistics over unfiltered cycle lengths.
//!
//! Independent of the forecast: no outlier band is applied here.

use crate::insight::phase::{classify_phase, CyclePhase};
use crate::ledger::view::LedgerView;
use crate::time::days_between;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary shown next to the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    /// Date of the most recent entry.
    pub last_entry_date: NaiveDate,
    /// Unsigned days between today and the most recent entry.
    pub elapsed_days: u32,
    pub phase: CyclePhase,
    /// Mean of every recorded cycle length; `None` without any.
    pub average_cycle: Option<f64>,
    /// Population standard deviation of the same values.
    pub stddev: Option<f64>,
}

impl LedgerStatistics {
    /// Average rounded up to whole days for display.
    pub fn display_average_days(&self) -> Option<u32> {
        self.average_cycle
            .map(f64::ceil)
            .filter(|value| *value > 0.0)
            .map(|value| value as u32)
    }

    /// Standard deviation with two decimals, `None` when it rounds to zero.
    pub fn display_stddev(&self) -> Option<String> {
        self.stddev
            .map(|value| format!("{value:.2}"))
            .filter(|value| value != "0.00")
    }
}

/// Computes statistics relative to `today`; `None` for an empty ledger.
pub fn compute_statistics(view: &LedgerView, today: NaiveDate) -> Option<LedgerStatistics> {
    let most_recent = view.most_recent()?;
    let elapsed_days = days_between(today, most_recent.date);
    let (average_cycle, stddev) = match mean_and_stddev(view) {
        Some((mean, stddev)) => (Some(mean), Some(stddev)),
        None => (None, None),
    };

    Some(LedgerStatistics {
        last_entry_date: most_recent.date,
        elapsed_days,
        phase: classify_phase(elapsed_days),
        average_cycle,
        stddev,
    })
}

/// Arithmetic mean and population standard deviation of non-null lengths.
pub fn mean_and_stddev(view: &LedgerView) -> Option<(f64, f64)> {
    let values = view
        .ascending()
        .filter_map(|entry| entry.cycle_length)
        .map(f64::from)
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }

    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let mean_of_squares = values.iter().map(|value| value * value).sum::<f64>() / count;
    let variance = mean_of_squares - mean * mean;
    Some((mean, variance.max(0.0).sqrt()))
}

#[cfg(test)]
mod tests {
    use super::{compute_statistics, mean_and_stddev};
    use crate::insight::phase::CyclePhase;
    use crate::ledger::view::LedgerView;
    use crate::model::entry::Entry;
    use chrono::{Duration, NaiveDate, Utc};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap() + Duration::days(offset)
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
    fn empty_ledger_is_unavailable() {
        assert!(compute_statistics(&LedgerView::default(), day(0)).is_none());
    }

    #[test]
    fn single_entry_has_phase_but_no_average() {
        let stats = compute_statistics(&ledger(&[0]), day(14)).unwrap();
        assert_eq!(stats.elapsed_days, 14);
        assert_eq!(stats.phase, CyclePhase::Ovulation);
        assert_eq!(stats.average_cycle, None);
        assert_eq!(stats.stddev, None);
        assert_eq!(stats.display_average_days(), None);
    }

    #[test]
    fn mean_and_stddev_use_all_recorded_values() {
        // cycles: 26, 30, 34 and a 2-day outlier the forecast would drop
        let view = ledger(&[0, 26, 56, 90, 92]);
        let (mean, stddev) = mean_and_stddev(&view).unwrap();
        assert!((mean - 23.0).abs() < 1e-9);
        let expected = ((9.0 + 49.0 + 121.0 + 441.0) / 4.0_f64).sqrt();
        assert!((stddev - expected).abs() < 1e-9);
    }

    #[test]
    fn identical_cycles_have_zero_deviation() {
        let stats = compute_statistics(&ledger(&[0, 28, 56, 84]), day(90)).unwrap();
        assert_eq!(stats.stddev, Some(0.0));
        assert_eq!(stats.display_stddev(), None);
        assert_eq!(stats.display_average_days(), Some(28));
        assert_eq!(stats.elapsed_days, 6);
        assert_eq!(stats.phase, CyclePhase::Follicular);
    }

    #[test]
    fn display_average_rounds_up() {
        let stats = compute_statistics(&ledger(&[0, 28, 57]), day(80)).unwrap();
        assert_eq!(stats.display_average_days(), Some(29));
        assert_eq!(stats.phase, CyclePhase::Luteal);
    }
}
