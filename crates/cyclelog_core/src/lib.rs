//! Core domain logic for the cycle ledger.
//! This crate is the single source of truth for cycle-length invariants,
//! forecasting and statistics.

pub mod config;
pub mod db;
pub mod insight;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod time;
pub mod transfer;

pub use config::CoreConfig;
pub use insight::forecast::{forecast_next, robust_average, Forecast};
pub use insight::phase::{classify_phase, CyclePhase};
pub use insight::projection::{
    cycle_series, recent_entries, CyclePoint, CycleSeries, RECENT_DEFAULT_LIMIT,
    SERIES_DEFAULT_LIMIT,
};
pub use insight::statistics::{compute_statistics, LedgerStatistics};
pub use ledger::batch::{DeletionBatch, DeletionPlan, SuccessorUpdate};
pub use ledger::importer::{ImportReport, ImportRow};
pub use ledger::invariant::{find_violations, InvariantViolation};
pub use ledger::view::LedgerView;
pub use ledger::{LedgerError, LedgerResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryId};
pub use notify::{ChangeKind, ChangeNotifier, LedgerChange, SubscriptionId};
pub use repo::entry_store::{EntryStore, ScanOrder, SqliteEntryStore, StoreError, StoreResult};
pub use service::{
    ImportOutcome, ImportPreview, LedgerService, PreviewRow, ServiceError, ServiceResult,
};
pub use time::{Clock, FixedClock, SystemClock};
pub use transfer::{ExportError, ImportParseError, RejectedRow, RowRejection};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
