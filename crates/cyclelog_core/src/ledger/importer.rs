//! Bulk importer built on the single-entry maintainer.
//!
//! # Invariants
//! - Rows are applied in input order; each insert re-resolves its neighbors by
//!   date, so the final ledger does not depend on row order.
//! - A row whose date already exists (in the ledger or earlier in the same
//!   import) is skipped, which makes re-importing the same rows a no-op.

use crate::ledger::maintainer::insert_entry;
use crate::ledger::{LedgerError, LedgerResult};
use crate::model::entry::Entry;
use crate::repo::entry_store::EntryStore;
use crate::time::epoch_ms_to_date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One parsed candidate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl ImportRow {
    pub fn new(date: NaiveDate, notes: Option<String>) -> Self {
        Self { date, notes }
    }

    /// Builds a row from epoch milliseconds, truncated to the calendar day.
    pub fn from_epoch_ms(epoch_ms: i64, notes: Option<String>) -> Option<Self> {
        epoch_ms_to_date(epoch_ms).map(|date| Self::new(date, notes))
    }
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Newly created entries, in input order.
    pub inserted: Vec<Entry>,
    /// Dates skipped because an entry already existed.
    pub skipped: Vec<NaiveDate>,
}

/// Applies `rows` through the maintainer insert path.
pub fn import_rows<S: EntryStore + ?Sized>(
    store: &S,
    rows: &[ImportRow],
    created_at: DateTime<Utc>,
) -> LedgerResult<ImportReport> {
    let mut report = ImportReport::default();
    for row in rows {
        match insert_entry(store, row.date, row.notes.clone(), created_at) {
            Ok(entry) => report.inserted.push(entry),
            Err(LedgerError::DuplicateDate(date)) => report.skipped.push(date),
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}
