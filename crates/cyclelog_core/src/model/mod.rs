//! Ledger domain model.
//!
//! # Responsibility
//! - Define the canonical entry record consumed by the ledger engine.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - `date` is the natural key: unique across the ledger, never changed.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod entry;
