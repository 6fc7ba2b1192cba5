//! Import text parser.
//!
//! # Invariants
//! - The header must name `date` and `notes` columns (case-insensitive, any
//!   order); otherwise the whole import is rejected.
//! - Date cells are epoch milliseconds, truncated to the UTC calendar day.
//! - A malformed data row is skipped and reported; valid rows still import.
//! - Quoted cells may span lines; a row is reported at the line it starts on.

use crate::ledger::importer::ImportRow;
use crate::model::entry::normalize_notes;
use csv::{Position, ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_COLUMN: &str = "date";
const NOTES_COLUMN: &str = "notes";

/// Whole-file import failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportParseError {
    /// Input has no header line.
    EmptyInput,
    /// Header does not name a required column.
    MissingColumn(&'static str),
    /// Header record could not be read.
    Unreadable(String),
}

impl Display for ImportParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "import input is empty"),
            Self::MissingColumn(column) => {
                write!(f, "import header is missing the `{column}` column")
            }
            Self::Unreadable(message) => write!(f, "import header is unreadable: {message}"),
        }
    }
}

impl Error for ImportParseError {}

/// Why one data row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowRejection {
    MissingDate,
    InvalidDate { value: String },
    DateOutOfRange { epoch_ms: i64 },
    Unreadable { message: String },
}

impl Display for RowRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "missing date"),
            Self::InvalidDate { value } => write!(f, "invalid date `{value}`"),
            Self::DateOutOfRange { epoch_ms } => write!(f, "date `{epoch_ms}` out of range"),
            Self::Unreadable { message } => write!(f, "unreadable row: {message}"),
        }
    }
}

/// A skipped data row with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: RowRejection,
}

/// Parsed import: accepted rows in input order plus rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub rejected: Vec<RejectedRow>,
}

struct ImportColumns {
    date: usize,
    notes: usize,
}

impl ImportColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportParseError> {
        if headers.iter().all(str::is_empty) {
            return Err(ImportParseError::EmptyInput);
        }
        Ok(Self {
            date: header_index(headers, DATE_COLUMN)?,
            notes: header_index(headers, NOTES_COLUMN)?,
        })
    }
}

/// Parses import text into candidate rows.
pub fn parse_import(text: &str) -> Result<ParsedImport, ImportParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| ImportParseError::Unreadable(err.to_string()))?
        .clone();
    let columns = ImportColumns::from_headers(&headers)?;

    let mut parsed = ParsedImport::default();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = line_at(text, err.position());
                parsed.rejected.push(RejectedRow {
                    line,
                    reason: RowRejection::Unreadable {
                        message: err.to_string(),
                    },
                });
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }

        let line = line_at(text, record.position());
        let notes = normalize_notes(record.get(columns.notes).map(str::to_string));
        match parse_date_cell(record.get(columns.date)) {
            Ok(epoch_ms) => match ImportRow::from_epoch_ms(epoch_ms, notes) {
                Some(row) => parsed.rows.push(row),
                None => parsed.rejected.push(RejectedRow {
                    line,
                    reason: RowRejection::DateOutOfRange { epoch_ms },
                }),
            },
            Err(reason) => parsed.rejected.push(RejectedRow { line, reason }),
        }
    }

    Ok(parsed)
}

/// 1-based line of the first byte at or after `position` that is not a line break.
fn line_at(text: &str, position: Option<&Position>) -> usize {
    let bytes = text.as_bytes();
    let offset = position
        .and_then(|position| usize::try_from(position.byte()).ok())
        .unwrap_or(0)
        .min(bytes.len());
    let start = bytes[offset..]
        .iter()
        .position(|byte| !matches!(*byte, b'\r' | b'\n'))
        .map_or(bytes.len(), |skipped| offset + skipped);
    bytes[..start].iter().filter(|byte| **byte == b'\n').count() + 1
}

fn header_index(headers: &StringRecord, name: &'static str) -> Result<usize, ImportParseError> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .ok_or(ImportParseError::MissingColumn(name))
}

fn parse_date_cell(cell: Option<&str>) -> Result<i64, RowRejection> {
    let value = cell.unwrap_or_default();
    if value.is_empty() {
        return Err(RowRejection::MissingDate);
    }
    value.parse::<i64>().map_err(|_| RowRejection::InvalidDate {
        value: value.to_string(),
    })
}
