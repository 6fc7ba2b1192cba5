//! Entry domain model.
//!
//! # Responsibility
//! - Define the dated record tracked by the cycle ledger.
//! - Normalize free-text notes before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - `cycle_length` is `None` only for the chronologically earliest entry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one ledger entry.
pub type EntryId = Uuid;

/// One dated cycle-start record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable ID assigned at creation.
    pub id: EntryId,
    /// Calendar day of the event; unique across the ledger.
    pub date: NaiveDate,
    /// Optional free text. Never read by any algorithm.
    pub notes: Option<String>,
    /// Days since the chronological predecessor; `None` for the earliest entry.
    pub cycle_length: Option<u32>,
    /// Marks the entry as the first day of a period. Defaults to `true`.
    pub is_period_start: bool,
    /// Insertion timestamp, audit only.
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Creates a new entry with a generated stable ID.
    ///
    /// `cycle_length` starts as `None`; the maintainer fills it in from the
    /// chronological predecessor before the entry is persisted.
    pub fn new(date: NaiveDate, notes: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            notes: normalize_notes(notes),
            cycle_length: None,
            is_period_start: true,
            created_at,
        }
    }

    /// Returns whether this entry has a recorded predecessor gap.
    pub fn has_cycle_length(&self) -> bool {
        self.cycle_length.is_some()
    }
}

/// Trims notes and maps blank input to `None`.
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_notes, Entry};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn new_entry_sets_defaults() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        let entry = Entry::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Some("  cramps ".to_string()),
            created_at,
        );

        assert!(!entry.id.is_nil());
        assert_eq!(entry.notes.as_deref(), Some("cramps"));
        assert_eq!(entry.cycle_length, None);
        assert!(entry.is_period_start);
        assert!(!entry.has_cycle_length());
        assert_eq!(entry.created_at, created_at);
    }

    #[test]
    fn blank_notes_normalize_to_none() {
        assert_eq!(normalize_notes(Some("   ".to_string())), None);
        assert_eq!(normalize_notes(None), None);
    }
}
