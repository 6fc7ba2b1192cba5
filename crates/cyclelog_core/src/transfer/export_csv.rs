//! Export text renderer.

use crate::ledger::view::LedgerView;
use crate::model::entry::Entry;
use csv::Writer;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

/// First line of every export.
pub const EXPORT_HEADER: &str = "date,start,cycle,notes,created_at";

const EXPORT_DATE_FORMAT: &str = "%-m/%-d/%Y";

pub type ExportResult<T> = Result<T, ExportError>;

/// Failure while rendering export text.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Encoding(FromUtf8Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "export write failed: {err}"),
            Self::Encoding(err) => write!(f, "export is not valid utf-8: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Encoding(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Renders entries that carry a cycle length, oldest first.
///
/// The earliest entry has no cycle length and is therefore omitted. Output is
/// newline-terminated and always starts with [`EXPORT_HEADER`]. Notes keep
/// their line breaks inside a quoted cell.
pub fn render_export(view: &LedgerView) -> ExportResult<String> {
    let mut writer = Writer::from_writer(Vec::with_capacity(
        EXPORT_HEADER.len() + 1 + view.len() * 48,
    ));
    writer.write_record(EXPORT_HEADER.split(','))?;

    for entry in view.ascending().filter(|entry| entry.has_cycle_length()) {
        write_row(&mut writer, entry)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    String::from_utf8(bytes).map_err(ExportError::Encoding)
}

fn write_row(writer: &mut Writer<Vec<u8>>, entry: &Entry) -> csv::Result<()> {
    let date = entry.date.format(EXPORT_DATE_FORMAT).to_string();
    let cycle = entry
        .cycle_length
        .map(|value| value.to_string())
        .unwrap_or_default();
    let created = entry
        .created_at
        .date_naive()
        .format(EXPORT_DATE_FORMAT)
        .to_string();
    writer.write_record([
        date.as_str(),
        if entry.is_period_start { "yes" } else { "no" },
        cycle.as_str(),
        entry.notes.as_deref().unwrap_or_default(),
        created.as_str(),
    ])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_export, EXPORT_HEADER};
    use crate::ledger::view::LedgerView;
    use crate::model::entry::Entry;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn entry(y: i32, m: u32, d: u32, cycle: Option<u32>, notes: Option<&str>) -> Entry {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        let mut entry = Entry::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            notes.map(str::to_string),
            created_at,
        );
        entry.cycle_length = cycle;
        entry
    }

    #[test]
    fn empty_ledger_renders_header_only() {
        assert_eq!(render_export(&LedgerView::default()).unwrap(), format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn earliest_entry_is_omitted_and_rows_ascend() {
        let view = LedgerView::new(vec![
            entry(2024, 2, 29, Some(29), Some("leap, day")),
            entry(2024, 1, 1, None, Some("first")),
            entry(2024, 1, 31, Some(30), None),
        ]);

        let lines = render_export(&view)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                EXPORT_HEADER.to_string(),
                "1/31/2024,yes,30,,3/5/2024".to_string(),
                "2/29/2024,yes,29,\"leap, day\",3/5/2024".to_string(),
            ]
        );
    }

    #[test]
    fn multi_line_notes_are_quoted_not_flattened() {
        let view = LedgerView::new(vec![
            entry(2024, 1, 1, None, None),
            entry(2024, 1, 29, Some(28), Some("cramps\nheavy, \"bad\"")),
        ]);
        let rendered = render_export(&view).unwrap();
        assert_eq!(
            rendered,
            format!("{EXPORT_HEADER}\n1/29/2024,yes,28,\"cramps\nheavy, \"\"bad\"\"\",3/5/2024\n")
        );

        let mut reader = csv::Reader::from_reader(rendered.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[3], "cramps\nheavy, \"bad\"");
    }
}
