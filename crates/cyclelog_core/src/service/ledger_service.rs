//! Ledger use-case service.
//!
//! # Responsibility
//! - Run every mutation inside one IMMEDIATE transaction.
//! - Emit one change notification per committed, non-empty mutation.
//! - Serve read projections from a fresh snapshot.
//!
//! # Invariants
//! - A failed mutation leaves the ledger untouched (the transaction is
//!   dropped without commit).
//! - Notifications are emitted only after commit.

use crate::insight::forecast::{forecast_next, Forecast};
use crate::insight::projection::{cycle_series, recent_entries, CycleSeries};
use crate::insight::statistics::{compute_statistics, LedgerStatistics};
use crate::ledger::batch::{delete_entries, DeletionPlan};
use crate::ledger::importer::{import_rows, ImportReport, ImportRow};
use crate::ledger::invariant::{find_violations, InvariantViolation};
use crate::ledger::maintainer::insert_entry;
use crate::ledger::view::LedgerView;
use crate::ledger::{LedgerError, LedgerResult};
use crate::model::entry::{Entry, EntryId};
use crate::notify::{ChangeKind, ChangeNotifier, LedgerChange};
use crate::repo::entry_store::{EntryStore, SqliteEntryStore, StoreError};
use crate::time::Clock;
use crate::transfer::{parse_import, render_export, ExportError, ImportParseError, RejectedRow};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error for service-level calls.
#[derive(Debug)]
pub enum ServiceError {
    Ledger(LedgerError),
    Store(StoreError),
    ImportFormat(ImportParseError),
    Export(ExportError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::ImportFormat(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::ImportFormat(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<LedgerError> for ServiceError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportParseError> for ServiceError {
    fn from(value: ImportParseError) -> Self {
        Self::ImportFormat(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// One previewed import row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// Row would be skipped: the date exists already or repeats an earlier row.
    pub already_present: bool,
}

/// Dry-run result for an import text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportPreview {
    pub rows: Vec<PreviewRow>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportPreview {
    pub fn new_row_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.already_present).count()
    }
}

/// Committed import of a text payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub report: ImportReport,
    pub rejected: Vec<RejectedRow>,
}

/// Use-case service over one SQLite connection.
pub struct LedgerService<'conn, C: Clock> {
    conn: &'conn Connection,
    clock: C,
    notifier: ChangeNotifier,
}

impl<'conn, C: Clock> LedgerService<'conn, C> {
    /// Creates a service with its own notifier.
    pub fn new(conn: &'conn Connection, clock: C) -> Self {
        Self::with_notifier(conn, clock, ChangeNotifier::new())
    }

    /// Creates a service that publishes into a shared notifier.
    pub fn with_notifier(conn: &'conn Connection, clock: C, notifier: ChangeNotifier) -> Self {
        Self {
            conn,
            clock,
            notifier,
        }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Inserts one entry on `date`.
    ///
    /// # Errors
    /// - `DuplicateDate` when the date is already recorded.
    pub fn add_entry(&self, date: NaiveDate, notes: Option<String>) -> ServiceResult<Entry> {
        let created_at = self.clock.now();
        let entry = self.in_transaction("entry_insert", |store| {
            insert_entry(store, date, notes, created_at)
        })?;

        info!("event=entry_insert module=service status=ok");
        self.notifier.emit(LedgerChange {
            kind: ChangeKind::EntryInserted,
            inserted: 1,
            deleted: 0,
        });
        Ok(entry)
    }

    /// Deletes one entry; a singleton batch.
    pub fn delete_entry(&self, id: EntryId) -> ServiceResult<DeletionPlan> {
        self.delete_entries(&[id])
    }

    /// Deletes an arbitrary selection as one atomic batch operation.
    ///
    /// # Errors
    /// - `EntryNotFound` when any id is unknown; nothing is deleted.
    pub fn delete_entries(&self, selection: &[EntryId]) -> ServiceResult<DeletionPlan> {
        if selection.is_empty() {
            return Ok(DeletionPlan::default());
        }

        let plan =
            self.in_transaction("entries_delete", |store| delete_entries(store, selection))?;

        info!(
            "event=entries_delete module=service status=ok deleted={} batches={}",
            plan.doomed.len(),
            plan.batches.len()
        );
        self.notifier.emit(LedgerChange {
            kind: ChangeKind::EntriesDeleted,
            inserted: 0,
            deleted: plan.doomed.len(),
        });
        Ok(plan)
    }

    /// Imports already-parsed rows in one transaction.
    pub fn import_rows(&self, rows: &[ImportRow]) -> ServiceResult<ImportReport> {
        let created_at = self.clock.now();
        let report = self.in_transaction("ledger_import", |store| {
            import_rows(store, rows, created_at)
        })?;

        info!(
            "event=ledger_import module=service status=ok inserted={} skipped={}",
            report.inserted.len(),
            report.skipped.len()
        );
        if !report.inserted.is_empty() {
            self.notifier.emit(LedgerChange {
                kind: ChangeKind::Imported,
                inserted: report.inserted.len(),
                deleted: 0,
            });
        }
        Ok(report)
    }

    /// Parses import text and commits its valid rows.
    ///
    /// # Errors
    /// - `ImportFormat` when the header is unusable; nothing is written.
    pub fn import_text(&self, text: &str) -> ServiceResult<ImportOutcome> {
        let parsed = parse_import(text).inspect_err(|err| {
            warn!("event=ledger_import module=service status=error error={err}");
        })?;
        if !parsed.rejected.is_empty() {
            warn!(
                "event=import_rows_rejected module=service status=partial rejected={}",
                parsed.rejected.len()
            );
        }

        let report = self.import_rows(&parsed.rows)?;
        Ok(ImportOutcome {
            report,
            rejected: parsed.rejected,
        })
    }

    /// Classifies each row of `text` without writing anything.
    pub fn preview_import(&self, text: &str) -> ServiceResult<ImportPreview> {
        let parsed = parse_import(text)?;
        let mut seen = self
            .snapshot()?
            .ascending()
            .map(|entry| entry.date)
            .collect::<BTreeSet<_>>();

        let rows = parsed
            .rows
            .into_iter()
            .map(|row| PreviewRow {
                already_present: !seen.insert(row.date),
                date: row.date,
                notes: row.notes,
            })
            .collect();

        Ok(ImportPreview {
            rows,
            rejected: parsed.rejected,
        })
    }

    /// Loads the full ordered ledger.
    pub fn snapshot(&self) -> ServiceResult<LedgerView> {
        let store = SqliteEntryStore::try_new(self.conn)?;
        Ok(LedgerView::load(&store)?)
    }

    pub fn find_entry(&self, id: EntryId) -> ServiceResult<Option<Entry>> {
        let store = SqliteEntryStore::try_new(self.conn)?;
        Ok(store.find_by_id(id)?)
    }

    /// Most recent entries first.
    pub fn recent(&self, limit: usize) -> ServiceResult<Vec<Entry>> {
        Ok(recent_entries(&self.snapshot()?, limit))
    }

    pub fn cycle_series(&self, limit: usize) -> ServiceResult<CycleSeries> {
        Ok(cycle_series(&self.snapshot()?, limit))
    }

    pub fn forecast(&self) -> ServiceResult<Option<Forecast>> {
        Ok(forecast_next(&self.snapshot()?, self.today()))
    }

    pub fn statistics(&self) -> ServiceResult<Option<LedgerStatistics>> {
        Ok(compute_statistics(&self.snapshot()?, self.today()))
    }

    /// Renders the export text for the current ledger.
    pub fn export_text(&self) -> ServiceResult<String> {
        Ok(render_export(&self.snapshot()?)?)
    }

    /// Lists every stored cycle length that disagrees with its predecessor gap.
    pub fn check(&self) -> ServiceResult<Vec<InvariantViolation>> {
        Ok(find_violations(&self.snapshot()?))
    }

    fn in_transaction<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&SqliteEntryStore<'_>) -> LedgerResult<T>,
    ) -> ServiceResult<T> {
        let result = run_in_transaction(self.conn, op);
        if let Err(err) = &result {
            warn!(
                "event={event} module=service status=error error_kind={}",
                ledger_error_kind(err)
            );
        }
        Ok(result?)
    }
}

fn run_in_transaction<T>(
    conn: &Connection,
    op: impl FnOnce(&SqliteEntryStore<'_>) -> LedgerResult<T>,
) -> LedgerResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let store = SqliteEntryStore::try_new(&tx)?;
    let value = op(&store)?;
    tx.commit()?;
    Ok(value)
}

fn ledger_error_kind(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::DuplicateDate(_) => "duplicate_date",
        LedgerError::EntryNotFound(_) => "entry_not_found",
        LedgerError::Transaction(_) => "transaction_failure",
    }
}
