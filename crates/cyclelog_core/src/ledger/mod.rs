//! Cycle ledger consistency engine.
//!
//! # Responsibility
//! - Keep every entry's derived `cycle_length` equal to the day gap to its
//!   chronological predecessor across insert, delete, batch delete and import.
//!
//! # Invariants
//! - Engine functions never open or commit transactions themselves; callers
//!   run them against a store built over one open transaction.
//! - The earliest entry always has `cycle_length == None`.

use crate::model::entry::EntryId;
use crate::repo::entry_store::StoreError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod batch;
pub mod importer;
pub mod invariant;
pub mod maintainer;
pub mod view;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error for ledger mutations.
#[derive(Debug)]
pub enum LedgerError {
    /// An entry already exists on the target date.
    DuplicateDate(NaiveDate),
    /// A referenced entry does not exist.
    EntryNotFound(EntryId),
    /// A store step failed; the surrounding transaction must be abandoned.
    Transaction(StoreError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateDate(date) => write!(f, "an entry already exists on {date}"),
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
            Self::Transaction(err) => write!(f, "ledger transaction failed: {err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transaction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::EntryNotFound(id),
            other => Self::Transaction(other),
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Transaction(StoreError::from(value))
    }
}
