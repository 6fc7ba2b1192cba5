//! Canonical ordered snapshot of the ledger.
//!
//! Entries are held oldest-first. Every consumer that needs "most recent
//! first" asks for the descending view explicitly, so positions used for batch
//! grouping and dates used for neighbor lookups never disagree.

use crate::model::entry::{Entry, EntryId};
use crate::repo::entry_store::{EntryStore, ScanOrder, StoreResult};

/// Immutable, date-ordered ledger snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerView {
    entries: Vec<Entry>,
}

impl LedgerView {
    /// Builds a view from entries in any order.
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(|entry| entry.date);
        Self { entries }
    }

    /// Loads a full snapshot from the store.
    pub fn load<S: EntryStore + ?Sized>(store: &S) -> StoreResult<Self> {
        Ok(Self::new(store.scan_all(ScanOrder::DateAscending)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest entry first.
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = &Entry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Most recent entry first.
    pub fn descending(&self) -> impl DoubleEndedIterator<Item = &Entry> + ExactSizeIterator {
        self.entries.iter().rev()
    }

    pub fn most_recent(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn earliest(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// Index of `id` in the most-recent-first ordering.
    pub fn descending_position(&self, id: EntryId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .map(|ascending| self.entries.len() - 1 - ascending)
    }

    /// Entry at `position` in the most-recent-first ordering.
    pub fn at_descending(&self, position: usize) -> Option<&Entry> {
        let last = self.entries.len().checked_sub(1)?;
        let ascending = last.checked_sub(position)?;
        self.entries.get(ascending)
    }

    /// Consumes the view, returning entries oldest-first.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}
