//! Single-entry insert that keeps neighbor cycle lengths consistent.
//!
//! # Invariants
//! - The new entry's cycle length is the gap to its nearest predecessor.
//! - The nearest successor is re-pointed at the new entry in the same
//!   transaction as the insert.

use crate::ledger::{LedgerError, LedgerResult};
use crate::model::entry::Entry;
use crate::repo::entry_store::EntryStore;
use crate::time::days_between;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;

/// Inserts one entry on `date` and recomputes the affected cycle lengths.
///
/// # Errors
/// - `DuplicateDate` when the ledger already holds an entry on `date`.
/// - `Transaction` when any store step fails; the caller must roll back.
pub fn insert_entry<S: EntryStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
) -> LedgerResult<Entry> {
    if store.find_exact(date)?.is_some() {
        return Err(LedgerError::DuplicateDate(date));
    }

    let mut entry = Entry::new(date, notes, created_at);
    entry.cycle_length = store
        .find_predecessor(date)?
        .map(|predecessor| days_between(predecessor.date, date));
    let stored = store.insert(&entry)?;

    if let Some(successor) = store.find_successor(date)? {
        let cycle_length = days_between(date, successor.date);
        store.update_cycle_length(successor.id, Some(cycle_length))?;
        debug!(
            "event=successor_update module=ledger status=ok cycle_before={:?} cycle_after={}",
            successor.cycle_length, cycle_length
        );
    }

    Ok(stored)
}
