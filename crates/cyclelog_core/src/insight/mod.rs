//! Read-only computations over a ledger snapshot.
//!
//! # Responsibility
//! - Forecast the next expected entry from an outlier-bounded average.
//! - Compute display statistics from unfiltered cycle lengths.
//! - Provide the list/chart projections the UI renders.
//!
//! # Invariants
//! - Nothing here touches storage; every function takes a `LedgerView`.
//! - Insufficient history is `None`, never an error.

pub mod forecast;
pub mod phase;
pub mod projection;
pub mod statistics;
