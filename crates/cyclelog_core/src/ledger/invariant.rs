//! Cycle-length consistency check over a ledger snapshot.

use crate::ledger::view::LedgerView;
use crate::model::entry::EntryId;
use crate::time::days_between;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One entry whose stored cycle length disagrees with its predecessor gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    pub entry_id: EntryId,
    pub date: NaiveDate,
    pub expected: Option<u32>,
    pub actual: Option<u32>,
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "entry {} on {}: expected cycle {:?}, stored {:?}",
            self.entry_id, self.date, self.expected, self.actual
        )
    }
}

/// Cycle length every entry should carry, oldest-first.
pub fn expected_cycle_lengths(view: &LedgerView) -> Vec<Option<u32>> {
    let mut previous: Option<NaiveDate> = None;
    view.ascending()
        .map(|entry| {
            let expected = previous.map(|date| days_between(date, entry.date));
            previous = Some(entry.date);
            expected
        })
        .collect()
}

/// Returns every entry that breaks the predecessor-gap rule.
pub fn find_violations(view: &LedgerView) -> Vec<InvariantViolation> {
    view.ascending()
        .zip(expected_cycle_lengths(view))
        .filter(|(entry, expected)| entry.cycle_length != *expected)
        .map(|(entry, expected)| InvariantViolation {
            entry_id: entry.id,
            date: entry.date,
            expected,
            actual: entry.cycle_length,
        })
        .collect()
}
