//! Text import/export framing for the ledger.
//!
//! # Responsibility
//! - Turn delimited import text into `ImportRow`s plus per-row rejections.
//! - Render the ledger into the export text format.
//!
//! # Invariants
//! - Parsing never touches storage; committing rows is the ledger's job.
//! - Cells follow RFC 4180 quoting via the `csv` crate; quoted notes may span
//!   lines on import and on export.

pub mod export_csv;
pub mod import_csv;

pub use export_csv::{render_export, ExportError, ExportResult, EXPORT_HEADER};
pub use import_csv::{parse_import, ImportParseError, ParsedImport, RejectedRow, RowRejection};
