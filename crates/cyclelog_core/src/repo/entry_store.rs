//! Entry store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the ordered-by-date primitives the ledger engine is built on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every primitive runs on whatever connection it was built from; building
//!   the store over a `Transaction` makes all calls part of that transaction.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Persisted dates are UTC midnight epoch milliseconds.

use crate::db::DbError;
use crate::model::entry::{Entry, EntryId};
use crate::time::{date_to_epoch_ms, epoch_ms_to_date, epoch_ms_to_datetime};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    date,
    is_period_start,
    notes,
    cycle_length,
    created_at
FROM entries";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for entry persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(EntryId),
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "entry store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Direction of a full ledger scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// Oldest entry first.
    DateAscending,
    /// Most recent entry first.
    DateDescending,
}

/// Ordered entry store consumed by the ledger engine.
pub trait EntryStore {
    /// Loads one entry by stable ID.
    fn find_by_id(&self, id: EntryId) -> StoreResult<Option<Entry>>;
    /// Loads the entry recorded exactly on `date`.
    fn find_exact(&self, date: NaiveDate) -> StoreResult<Option<Entry>>;
    /// Loads the latest entry strictly before `date`.
    fn find_predecessor(&self, date: NaiveDate) -> StoreResult<Option<Entry>>;
    /// Loads the earliest entry strictly after `date`.
    fn find_successor(&self, date: NaiveDate) -> StoreResult<Option<Entry>>;
    /// Loads the full ledger in the requested date order.
    fn scan_all(&self, order: ScanOrder) -> StoreResult<Vec<Entry>>;
    /// Persists a new entry and returns its stored form.
    fn insert(&self, entry: &Entry) -> StoreResult<Entry>;
    /// Overwrites the derived cycle length of one entry.
    fn update_cycle_length(&self, id: EntryId, cycle_length: Option<u32>) -> StoreResult<()>;
    /// Deletes every listed entry and returns the number of removed rows.
    fn delete_many(&self, ids: &[EntryId]) -> StoreResult<usize>;
}

/// SQLite-backed entry store.
pub struct SqliteEntryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryStore<'conn> {
    /// Constructs a store from a migrated connection or open transaction.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        if !table_exists(conn, "entries")? {
            return Err(StoreError::MissingRequiredTable("entries"));
        }
        Ok(Self { conn })
    }

    fn query_optional(
        &self,
        filter_sql: &str,
        bind: impl rusqlite::Params,
    ) -> StoreResult<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} {filter_sql}"))?;
        let mut rows = stmt.query(bind)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }
}

impl EntryStore for SqliteEntryStore<'_> {
    fn find_by_id(&self, id: EntryId) -> StoreResult<Option<Entry>> {
        self.query_optional("WHERE id = ?1;", [id.to_string()])
    }

    fn find_exact(&self, date: NaiveDate) -> StoreResult<Option<Entry>> {
        self.query_optional("WHERE date = ?1 LIMIT 1;", [date_to_epoch_ms(date)])
    }

    fn find_predecessor(&self, date: NaiveDate) -> StoreResult<Option<Entry>> {
        self.query_optional(
            "WHERE date < ?1 ORDER BY date DESC LIMIT 1;",
            [date_to_epoch_ms(date)],
        )
    }

    fn find_successor(&self, date: NaiveDate) -> StoreResult<Option<Entry>> {
        self.query_optional(
            "WHERE date > ?1 ORDER BY date ASC LIMIT 1;",
            [date_to_epoch_ms(date)],
        )
    }

    fn scan_all(&self, order: ScanOrder) -> StoreResult<Vec<Entry>> {
        let direction = match order {
            ScanOrder::DateAscending => "ASC",
            ScanOrder::DateDescending => "DESC",
        };
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY date {direction};"))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn insert(&self, entry: &Entry) -> StoreResult<Entry> {
        self.conn.execute(
            "INSERT INTO entries (
                id,
                date,
                is_period_start,
                notes,
                cycle_length,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.id.to_string(),
                date_to_epoch_ms(entry.date),
                bool_to_int(entry.is_period_start),
                entry.notes.as_deref(),
                entry.cycle_length,
                entry.created_at.timestamp_millis(),
            ],
        )?;

        self.find_by_id(entry.id)?
            .ok_or(StoreError::NotFound(entry.id))
    }

    fn update_cycle_length(&self, id: EntryId, cycle_length: Option<u32>) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE entries SET cycle_length = ?2 WHERE id = ?1;",
            params![id.to_string(), cycle_length],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    fn delete_many(&self, ids: &[EntryId]) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let bind_values = ids
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect::<Vec<_>>();
        let removed = self.conn.execute(
            &format!("DELETE FROM entries WHERE id IN ({placeholders});"),
            params_from_iter(bind_values),
        )?;
        Ok(removed)
    }
}

fn parse_entry_row(row: &Row<'_>) -> StoreResult<Entry> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in entries.id"))
    })?;

    let date_ms: i64 = row.get("date")?;
    let date = epoch_ms_to_date(date_ms)
        .filter(|date| date_to_epoch_ms(*date) == date_ms)
        .ok_or_else(|| {
            StoreError::InvalidData(format!(
                "date `{date_ms}` in entries.date is not a UTC midnight"
            ))
        })?;

    let is_period_start = match row.get::<_, i64>("is_period_start")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_period_start value `{other}` in entries.is_period_start"
            )));
        }
    };

    let cycle_length = match row.get::<_, Option<i64>>("cycle_length")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid cycle_length `{value}` in entries.cycle_length"
            ))
        })?),
        None => None,
    };

    let created_ms: i64 = row.get("created_at")?;
    let created_at = epoch_ms_to_datetime(created_ms).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid created_at `{created_ms}` in entries.created_at"
        ))
    })?;

    Ok(Entry {
        id,
        date,
        notes: row.get("notes")?,
        cycle_length,
        is_period_start,
        created_at,
    })
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryStore, ScanOrder, SqliteEntryStore, StoreError};
    use crate::db::open_db_in_memory;
    use crate::model::entry::Entry;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rusqlite::Connection;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn entry_on(offset: i64) -> Entry {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Entry::new(day(offset), None, created_at)
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteEntryStore::try_new(&conn).err().unwrap();
        assert!(matches!(err, StoreError::MissingRequiredTable("entries")));
    }

    #[test]
    fn neighbor_lookups_use_strict_date_bounds() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEntryStore::try_new(&conn).unwrap();
        for offset in [0, 28, 56] {
            store.insert(&entry_on(offset)).unwrap();
        }

        let pred = store.find_predecessor(day(28)).unwrap().unwrap();
        assert_eq!(pred.date, day(0));
        let succ = store.find_successor(day(28)).unwrap().unwrap();
        assert_eq!(succ.date, day(56));
        assert!(store.find_predecessor(day(0)).unwrap().is_none());
        assert!(store.find_successor(day(56)).unwrap().is_none());
        assert_eq!(store.find_exact(day(28)).unwrap().unwrap().date, day(28));
        assert!(store.find_exact(day(29)).unwrap().is_none());
    }

    #[test]
    fn scan_all_honors_requested_order() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEntryStore::try_new(&conn).unwrap();
        for offset in [56, 0, 28] {
            store.insert(&entry_on(offset)).unwrap();
        }

        let ascending = store.scan_all(ScanOrder::DateAscending).unwrap();
        let descending = store.scan_all(ScanOrder::DateDescending).unwrap();
        assert_eq!(
            ascending.iter().map(|e| e.date).collect::<Vec<_>>(),
            vec![day(0), day(28), day(56)]
        );
        assert_eq!(
            descending.iter().map(|e| e.date).collect::<Vec<_>>(),
            vec![day(56), day(28), day(0)]
        );
    }

    #[test]
    fn duplicate_date_violates_unique_index() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEntryStore::try_new(&conn).unwrap();
        store.insert(&entry_on(3)).unwrap();

        let err = store.insert(&entry_on(3)).unwrap_err();
        assert!(matches!(err, StoreError::Db(_)));
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEntryStore::try_new(&conn).unwrap();
        let stored = store.insert(&entry_on(0)).unwrap();

        store.update_cycle_length(stored.id, Some(31)).unwrap();
        assert_eq!(
            store.find_by_id(stored.id).unwrap().unwrap().cycle_length,
            Some(31)
        );

        let missing = entry_on(1).id;
        assert!(matches!(
            store.update_cycle_length(missing, None).unwrap_err(),
            StoreError::NotFound(id) if id == missing
        ));
        assert_eq!(store.delete_many(&[stored.id, missing]).unwrap(), 1);
        assert_eq!(store.delete_many(&[]).unwrap(), 0);
    }

    #[test]
    fn non_midnight_dates_are_rejected_on_read() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO entries (id, date, cycle_length) VALUES (?1, ?2, NULL);",
            rusqlite::params![uuid::Uuid::new_v4().to_string(), 1_700_000_000_123_i64],
        )
        .unwrap();

        let store = SqliteEntryStore::try_new(&conn).unwrap();
        let err = store.scan_all(ScanOrder::DateAscending).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
