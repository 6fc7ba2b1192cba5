//! Calendar-day arithmetic and clock abstraction.
//!
//! # Responsibility
//! - Convert between persisted epoch milliseconds and calendar days.
//! - Provide the day-difference helpers every cycle computation uses.
//! - Abstract "today" so forecast/statistics stay deterministic in tests.
//!
//! # Invariants
//! - Calendar days are UTC days; a persisted date is always UTC midnight.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Clock abstracts access to the current timestamp.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC calendar day. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Pins the clock to midnight of `day`.
    pub fn at_day(day: NaiveDate) -> Self {
        Self::new(start_of_day(day))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Unsigned number of whole days between two calendar days.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> u32 {
    let days = (b - a).num_days().unsigned_abs();
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Signed number of days from `from` to `to` (negative when `to` is earlier).
pub fn days_from(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Adds `days` to a calendar day, saturating at chrono's supported range.
pub fn add_days(day: NaiveDate, days: u32) -> NaiveDate {
    day.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Epoch milliseconds of UTC midnight for `day`.
pub fn date_to_epoch_ms(day: NaiveDate) -> i64 {
    start_of_day(day).timestamp_millis()
}

/// Truncates epoch milliseconds to the UTC calendar day containing them.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn epoch_ms_to_date(epoch_ms: i64) -> Option<NaiveDate> {
    let days = epoch_ms.div_euclid(MILLIS_PER_DAY);
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::try_days(days)?)
}

/// Converts persisted epoch milliseconds into a UTC timestamp.
pub fn epoch_ms_to_datetime(epoch_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(epoch_ms).single()
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::{
        add_days, date_to_epoch_ms, days_between, days_from, epoch_ms_to_date, Clock, FixedClock,
    };
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_between_is_symmetric() {
        assert_eq!(days_between(day(2024, 1, 1), day(2024, 1, 29)), 28);
        assert_eq!(days_between(day(2024, 1, 29), day(2024, 1, 1)), 28);
        assert_eq!(days_between(day(2024, 1, 1), day(2024, 1, 1)), 0);
    }

    #[test]
    fn days_from_keeps_sign() {
        assert_eq!(days_from(day(2024, 3, 10), day(2024, 3, 3)), -7);
        assert_eq!(days_from(day(2024, 2, 28), day(2024, 3, 1)), 2);
    }

    #[test]
    fn epoch_ms_truncates_to_utc_midnight() {
        let midnight = date_to_epoch_ms(day(2023, 5, 17));
        assert_eq!(epoch_ms_to_date(midnight), Some(day(2023, 5, 17)));
        assert_eq!(
            epoch_ms_to_date(midnight + 23 * 3_600_000 + 59_000),
            Some(day(2023, 5, 17))
        );
        assert_eq!(epoch_ms_to_date(-1), Some(day(1969, 12, 31)));
    }

    #[test]
    fn epoch_ms_out_of_range_is_none() {
        assert_eq!(epoch_ms_to_date(i64::MAX), None);
    }

    #[test]
    fn add_days_crosses_month_boundaries() {
        assert_eq!(add_days(day(2024, 1, 30), 30), day(2024, 2, 29));
    }

    #[test]
    fn fixed_clock_reports_pinned_day() {
        let clock = FixedClock::at_day(day(2026, 10, 18));
        assert_eq!(clock.today(), day(2026, 10, 18));
    }
}
