//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the ordered store contract the ledger engine consumes.
//! - Isolate SQLite query details from ledger orchestration.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod entry_store;
