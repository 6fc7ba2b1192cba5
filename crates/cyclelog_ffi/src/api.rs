//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose ledger mutations and read models to Dart via FRB.
//! - Flatten core types into plain envelopes (strings, integers, options).
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Dates cross the boundary as epoch milliseconds of UTC midnight.
//! - Every call opens its own connection; no state is shared between calls
//!   besides the resolved database path.

use cyclelog_core::db::open_db;
use cyclelog_core::time::{date_to_epoch_ms, epoch_ms_to_date};
use cyclelog_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Entry, EntryId, LedgerService, SystemClock, RECENT_DEFAULT_LIMIT,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const LIST_LIMIT_MAX: u32 = 500;
static LEDGER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for the same arguments; conflicting re-init returns an error.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One entry as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub id: String,
    pub date_epoch_ms: i64,
    pub cycle_length: Option<u32>,
    pub notes: Option<String>,
    pub is_period_start: bool,
}

/// Result of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActionResponse {
    pub ok: bool,
    /// Created entry id for inserts.
    pub entry_id: Option<String>,
    /// Rows inserted or deleted.
    pub affected: u32,
    pub message: String,
}

impl LedgerActionResponse {
    fn success(message: impl Into<String>, entry_id: Option<String>, affected: usize) -> Self {
        Self {
            ok: true,
            entry_id,
            affected: saturating_u32(affected),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            affected: 0,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListResponse {
    pub ok: bool,
    /// Most recent first.
    pub items: Vec<EntryItem>,
    pub applied_limit: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreviewItem {
    pub date_epoch_ms: i64,
    pub notes: Option<String>,
    pub already_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreviewResponse {
    pub ok: bool,
    pub rows: Vec<ImportPreviewItem>,
    /// 1-based line numbers of rows that could not be parsed.
    pub rejected_lines: Vec<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub ok: bool,
    pub inserted: u32,
    pub skipped: u32,
    pub rejected: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastResponse {
    pub available: bool,
    pub expected_date_epoch_ms: Option<i64>,
    /// Negative when overdue.
    pub days_until: Option<i64>,
    pub robust_average: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsResponse {
    pub available: bool,
    pub last_entry_epoch_ms: Option<i64>,
    pub elapsed_days: Option<u32>,
    /// `Follicular|Ovulation|Luteal`.
    pub phase: Option<String>,
    /// Average rounded up to whole days.
    pub average_days: Option<u32>,
    /// Standard deviation formatted with two decimals.
    pub stddev: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    pub text: String,
    pub message: String,
}

/// Records a cycle start on the UTC day containing `date_epoch_ms`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_add_entry(date_epoch_ms: i64, notes: Option<String>) -> LedgerActionResponse {
    add_entry_at(&resolve_db_path(), date_epoch_ms, notes)
}

/// Deletes the listed entries as one batch.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_delete_entries(entry_ids: Vec<String>) -> LedgerActionResponse {
    delete_entries_at(&resolve_db_path(), &entry_ids)
}

/// Lists entries, most recent first. `None` or `0` uses the default limit.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_list_entries(limit: Option<u32>) -> EntryListResponse {
    list_entries_at(&resolve_db_path(), limit)
}

/// Parses import text and classifies rows without writing.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_preview_import(text: String) -> ImportPreviewResponse {
    preview_import_at(&resolve_db_path(), &text)
}

/// Commits the valid rows of an import text.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_import(text: String) -> ImportResponse {
    import_at(&resolve_db_path(), &text)
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_export() -> ExportResponse {
    export_at(&resolve_db_path())
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_forecast() -> ForecastResponse {
    forecast_at(&resolve_db_path())
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_statistics() -> StatisticsResponse {
    statistics_at(&resolve_db_path())
}

fn add_entry_at(db_path: &Path, date_epoch_ms: i64, notes: Option<String>) -> LedgerActionResponse {
    let Some(date) = epoch_ms_to_date(date_epoch_ms) else {
        return LedgerActionResponse::failure(format!("date out of range: {date_epoch_ms}"));
    };
    match with_service(db_path, |service| service.add_entry(date, notes).map_err(|e| e.to_string())) {
        Ok(entry) => LedgerActionResponse::success("Entry added.", Some(entry.id.to_string()), 1),
        Err(err) => LedgerActionResponse::failure(format!("ledger_add_entry failed: {err}")),
    }
}

fn delete_entries_at(db_path: &Path, entry_ids: &[String]) -> LedgerActionResponse {
    let ids = match parse_ids(entry_ids) {
        Ok(ids) => ids,
        Err(err) => return LedgerActionResponse::failure(err),
    };
    match with_service(db_path, |service| {
        service.delete_entries(&ids).map_err(|e| e.to_string())
    }) {
        Ok(plan) => LedgerActionResponse::success(
            format!("Deleted {} entr(ies).", plan.doomed.len()),
            None,
            plan.doomed.len(),
        ),
        Err(err) => LedgerActionResponse::failure(format!("ledger_delete_entries failed: {err}")),
    }
}

fn list_entries_at(db_path: &Path, limit: Option<u32>) -> EntryListResponse {
    let applied_limit = normalize_list_limit(limit);
    match with_service(db_path, |service| {
        service
            .recent(applied_limit as usize)
            .map_err(|e| e.to_string())
    }) {
        Ok(entries) => EntryListResponse {
            ok: true,
            message: format!("{} entr(ies).", entries.len()),
            items: entries.iter().map(to_entry_item).collect(),
            applied_limit,
        },
        Err(err) => EntryListResponse {
            ok: false,
            items: Vec::new(),
            applied_limit,
            message: format!("ledger_list_entries failed: {err}"),
        },
    }
}

fn preview_import_at(db_path: &Path, text: &str) -> ImportPreviewResponse {
    match with_service(db_path, |service| {
        service.preview_import(text).map_err(|e| e.to_string())
    }) {
        Ok(preview) => ImportPreviewResponse {
            ok: true,
            message: format!("{} new row(s).", preview.new_row_count()),
            rows: preview
                .rows
                .into_iter()
                .map(|row| ImportPreviewItem {
                    date_epoch_ms: date_to_epoch_ms(row.date),
                    notes: row.notes,
                    already_present: row.already_present,
                })
                .collect(),
            rejected_lines: preview
                .rejected
                .iter()
                .map(|row| saturating_u32(row.line))
                .collect(),
        },
        Err(err) => ImportPreviewResponse {
            ok: false,
            rows: Vec::new(),
            rejected_lines: Vec::new(),
            message: format!("ledger_preview_import failed: {err}"),
        },
    }
}

fn import_at(db_path: &Path, text: &str) -> ImportResponse {
    match with_service(db_path, |service| {
        service.import_text(text).map_err(|e| e.to_string())
    }) {
        Ok(outcome) => ImportResponse {
            ok: true,
            inserted: saturating_u32(outcome.report.inserted.len()),
            skipped: saturating_u32(outcome.report.skipped.len()),
            rejected: saturating_u32(outcome.rejected.len()),
            message: "Import complete.".to_string(),
        },
        Err(err) => ImportResponse {
            ok: false,
            inserted: 0,
            skipped: 0,
            rejected: 0,
            message: format!("ledger_import failed: {err}"),
        },
    }
}

fn export_at(db_path: &Path) -> ExportResponse {
    match with_service(db_path, |service| service.export_text().map_err(|e| e.to_string())) {
        Ok(text) => ExportResponse {
            ok: true,
            text,
            message: String::new(),
        },
        Err(err) => ExportResponse {
            ok: false,
            text: String::new(),
            message: format!("ledger_export failed: {err}"),
        },
    }
}

fn forecast_at(db_path: &Path) -> ForecastResponse {
    let unavailable = |message: String| ForecastResponse {
        available: false,
        expected_date_epoch_ms: None,
        days_until: None,
        robust_average: None,
        message,
    };
    match with_service(db_path, |service| service.forecast().map_err(|e| e.to_string())) {
        Ok(Some(forecast)) => ForecastResponse {
            available: true,
            expected_date_epoch_ms: Some(date_to_epoch_ms(forecast.expected_date)),
            days_until: Some(forecast.days_until),
            robust_average: Some(forecast.robust_average),
            message: String::new(),
        },
        Ok(None) => unavailable("Not enough entries to forecast.".to_string()),
        Err(err) => unavailable(format!("ledger_forecast failed: {err}")),
    }
}

fn statistics_at(db_path: &Path) -> StatisticsResponse {
    let unavailable = |message: String| StatisticsResponse {
        available: false,
        last_entry_epoch_ms: None,
        elapsed_days: None,
        phase: None,
        average_days: None,
        stddev: None,
        message,
    };
    match with_service(db_path, |service| service.statistics().map_err(|e| e.to_string())) {
        Ok(Some(stats)) => StatisticsResponse {
            available: true,
            last_entry_epoch_ms: Some(date_to_epoch_ms(stats.last_entry_date)),
            elapsed_days: Some(stats.elapsed_days),
            phase: Some(stats.phase.label().to_string()),
            average_days: stats.display_average_days(),
            stddev: stats.display_stddev(),
            message: String::new(),
        },
        Ok(None) => unavailable("Ledger is empty.".to_string()),
        Err(err) => unavailable(format!("ledger_statistics failed: {err}")),
    }
}

fn with_service<T>(
    db_path: &Path,
    f: impl FnOnce(&LedgerService<'_, SystemClock>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(db_path).map_err(|err| {
        warn!("event=ffi_db_open module=ffi status=error error={err}");
        format!("ledger DB open failed: {err}")
    })?;
    let service = LedgerService::new(&conn, SystemClock);
    f(&service)
}

fn resolve_db_path() -> PathBuf {
    LEDGER_DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => saturating_u32(RECENT_DEFAULT_LIMIT),
        Some(value) => value.min(LIST_LIMIT_MAX),
    }
}

fn parse_ids(raw: &[String]) -> Result<Vec<EntryId>, String> {
    raw.iter()
        .map(|value| {
            uuid::Uuid::parse_str(value.trim()).map_err(|_| format!("invalid entry id: {value}"))
        })
        .collect()
}

fn to_entry_item(entry: &Entry) -> EntryItem {
    EntryItem {
        id: entry.id.to_string(),
        date_epoch_ms: date_to_epoch_ms(entry.date),
        cycle_length: entry.cycle_length,
        notes: entry.notes.clone(),
        is_period_start: entry.is_period_start,
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
