use chrono::NaiveDate;
use cyclelog_core::db::open_db_in_memory;
use cyclelog_core::time::date_to_epoch_ms;
use cyclelog_core::{FixedClock, ImportParseError, LedgerService, RowRejection, ServiceError};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn import_text(rows: &[(NaiveDate, &str)]) -> String {
    let mut text = String::from("date,notes\n");
    for (date, notes) in rows {
        text.push_str(&format!("{},\"{}\"\n", date_to_epoch_ms(*date), notes));
    }
    text
}

#[test]
fn import_skips_existing_dates_without_touching_them() {
    let conn = open_db_in_memory().unwrap();
    let service = LedgerService::new(&conn, FixedClock::at_day(ymd(2024, 6, 1)));
    service.add_entry(ymd(2024, 1, 1), None).unwrap();
    let kept = service
        .add_entry(ymd(2024, 1, 30), Some("original".to_string()))
        .unwrap();

    let outcome = service
        .import_text(&import_text(&[
            (ymd(2024, 1, 30), "replacement"),
            (ymd(2024, 2, 27), "new"),
        ]))
        .unwrap();

    assert_eq!(outcome.report.skipped, vec![ymd(2024, 1, 30)]);
    assert_eq!(outcome.report.inserted.len(), 1);
    let stored = service.find_entry(kept.id).unwrap().unwrap();
    assert_eq!(stored.notes.as_deref(), Some("original"));
    assert_eq!(stored.cycle_length, Some(29));
}

#[test]
fn unusable_header_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = LedgerService::new(&conn, FixedClock::at_day(ymd(2024, 6, 1)));

    let err = service
        .import_text("when,notes\n1704067200000,x\n")
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::ImportFormat(ImportParseError::MissingColumn("date"))
    ));
    assert!(service.snapshot().unwrap().is_empty());
}

#[test]
fn malformed_rows_are_reported_and_valid_rows_commit() {
    let conn = open_db_in_memory().unwrap();
    let service = LedgerService::new(&conn, FixedClock::at_day(ymd(2024, 6, 1)));

    let outcome = service
        .import_text("date,notes\n1704067200000,a\nnot-a-date,b\n1706486400000,c\n")
        .unwrap();

    assert_eq!(outcome.report.inserted.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].line, 3);
    assert!(matches!(
        outcome.rejected[0].reason,
        RowRejection::InvalidDate { .. }
    ));
    assert!(service.check().unwrap().is_empty());
}

#[test]
fn preview_then_import_agree_on_new_rows() {
    let conn = open_db_in_memory().unwrap();
    let service = LedgerService::new(&conn, FixedClock::at_day(ymd(2024, 6, 1)));
    service.add_entry(ymd(2024, 3, 1), None).unwrap();
    let text = import_text(&[
        (ymd(2024, 3, 1), ""),
        (ymd(2024, 1, 3), "older"),
        (ymd(2024, 4, 2), ""),
    ]);

    let preview = service.preview_import(&text).unwrap();
    let outcome = service.import_text(&text).unwrap();

    assert_eq!(preview.new_row_count(), outcome.report.inserted.len());
    assert_eq!(
        service
            .snapshot()
            .unwrap()
            .ascending()
            .map(|entry| entry.cycle_length)
            .collect::<Vec<_>>(),
        vec![None, Some(58), Some(32)]
    );
}

#[test]
fn export_lists_every_entry_after_the_earliest() {
    let conn = open_db_in_memory().unwrap();
    let service = LedgerService::new(&conn, FixedClock::at_day(ymd(2024, 6, 1)));
    service
        .import_text(&import_text(&[
            (ymd(2024, 2, 28), "with, comma"),
            (ymd(2024, 1, 31), ""),
            (ymd(2024, 3, 27), "plain"),
        ]))
        .unwrap();

    let exported = service.export_text().unwrap();

    assert_eq!(
        exported,
        "date,start,cycle,notes,created_at\n\
         2/28/2024,yes,28,\"with, comma\",6/1/2024\n\
         3/27/2024,yes,28,plain,6/1/2024\n"
    );
}

#[test]
fn quoted_multi_line_notes_import_whole_and_export_intact() {
    let conn = open_db_in_memory().unwrap();
    let service = LedgerService::new(&conn, FixedClock::at_day(ymd(2024, 6, 1)));

    let outcome = service
        .import_text("date,notes\n1704067200000,\"cramps\nheavy\"\n1706486400000,ok\n")
        .unwrap();

    assert!(outcome.rejected.is_empty());
    let notes = service
        .snapshot()
        .unwrap()
        .ascending()
        .map(|entry| entry.notes.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        notes,
        vec![Some("cramps\nheavy".to_string()), Some("ok".to_string())]
    );

    service
        .import_text("date,notes\n1708992000000,\"line one\nline two\"\n")
        .unwrap();
    let exported = service.export_text().unwrap();
    assert!(exported.ends_with("2/27/2024,yes,29,\"line one\nline two\",6/1/2024\n"));
}
