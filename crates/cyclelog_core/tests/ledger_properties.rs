use chrono::{Duration, NaiveDate};
use cyclelog_core::db::open_db_in_memory;
use cyclelog_core::{find_violations, FixedClock, ImportRow, LedgerService, LedgerView};
use proptest::prelude::*;
use proptest::sample::subsequence;
use rusqlite::Connection;
use std::collections::BTreeSet;

fn day(offset: u16) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap() + Duration::days(i64::from(offset))
}

fn service(conn: &Connection) -> LedgerService<'_, FixedClock> {
    LedgerService::new(conn, FixedClock::at_day(day(0)))
}

fn shape(view: &LedgerView) -> Vec<(NaiveDate, Option<u32>, Option<String>)> {
    view.ascending()
        .map(|entry| (entry.date, entry.cycle_length, entry.notes.clone()))
        .collect()
}

fn rows(offsets: &[u16]) -> Vec<ImportRow> {
    offsets
        .iter()
        .map(|offset| ImportRow::new(day(*offset), Some(format!("row {offset}"))))
        .collect()
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u16),
    Delete(Vec<usize>),
    Import(Vec<u16>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u16..400).prop_map(Op::Insert),
        1 => prop::collection::vec(0usize..32, 1..4).prop_map(Op::Delete),
        1 => prop::collection::vec(0u16..400, 0..6).prop_map(Op::Import),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn every_mutation_preserves_cycle_lengths(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let conn = open_db_in_memory().unwrap();
        let service = service(&conn);

        for op in ops {
            match op {
                Op::Insert(offset) => {
                    let _ = service.add_entry(day(offset), None);
                }
                Op::Delete(picks) => {
                    let view = service.snapshot().unwrap();
                    if view.is_empty() {
                        continue;
                    }
                    let ids = picks
                        .iter()
                        .filter_map(|pick| view.at_descending(pick % view.len()))
                        .map(|entry| entry.id)
                        .collect::<Vec<_>>();
                    service.delete_entries(&ids).unwrap();
                }
                Op::Import(offsets) => {
                    service.import_rows(&rows(&offsets)).unwrap();
                }
            }
            prop_assert!(find_violations(&service.snapshot().unwrap()).is_empty());
        }
    }

    #[test]
    fn batch_delete_matches_one_at_a_time_in_any_order(
        (offsets, doomed_order) in prop::collection::btree_set(0u16..500, 2..20)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|offsets| {
                let len = offsets.len();
                let order = subsequence(offsets.clone(), 0..=len).prop_shuffle();
                (Just(offsets), order)
            }),
    ) {
        let batch_conn = open_db_in_memory().unwrap();
        let single_conn = open_db_in_memory().unwrap();
        let batch = service(&batch_conn);
        let single = service(&single_conn);
        batch.import_rows(&rows(&offsets)).unwrap();
        single.import_rows(&rows(&offsets)).unwrap();

        let doomed_dates = doomed_order
            .iter()
            .map(|offset| day(*offset))
            .collect::<BTreeSet<_>>();
        let batch_ids = batch
            .snapshot()
            .unwrap()
            .ascending()
            .filter(|entry| doomed_dates.contains(&entry.date))
            .map(|entry| entry.id)
            .collect::<Vec<_>>();
        batch.delete_entries(&batch_ids).unwrap();

        let single_view = single.snapshot().unwrap();
        for offset in &doomed_order {
            let id = single_view
                .ascending()
                .find(|entry| entry.date == day(*offset))
                .map(|entry| entry.id)
                .unwrap();
            single.delete_entry(id).unwrap();
            prop_assert!(single.check().unwrap().is_empty());
        }

        prop_assert_eq!(
            shape(&batch.snapshot().unwrap()),
            shape(&single.snapshot().unwrap())
        );
        prop_assert!(batch.check().unwrap().is_empty());
    }

    #[test]
    fn importing_twice_equals_importing_once(offsets in prop::collection::vec(0u16..400, 0..16)) {
        let conn = open_db_in_memory().unwrap();
        let service = service(&conn);

        service.import_rows(&rows(&offsets)).unwrap();
        let once = service.snapshot().unwrap();
        let second = service.import_rows(&rows(&offsets)).unwrap();

        prop_assert!(second.inserted.is_empty());
        prop_assert_eq!(service.snapshot().unwrap(), once);
    }

    #[test]
    fn import_order_does_not_change_the_ledger(
        offsets in prop::collection::btree_set(0u16..400, 0..16)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
    ) {
        let shuffled_conn = open_db_in_memory().unwrap();
        let sorted_conn = open_db_in_memory().unwrap();
        let shuffled = service(&shuffled_conn);
        let sorted = service(&sorted_conn);
        let mut ascending = offsets.clone();
        ascending.sort_unstable();

        shuffled.import_rows(&rows(&offsets)).unwrap();
        sorted.import_rows(&rows(&ascending)).unwrap();

        prop_assert_eq!(
            shape(&shuffled.snapshot().unwrap()),
            shape(&sorted.snapshot().unwrap())
        );
    }

    #[test]
    fn any_subset_deletion_keeps_survivors_in_order(
        offsets in prop::collection::btree_set(0u16..300, 1..12)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|offsets| {
                let len = offsets.len();
                (Just(offsets), subsequence((0..len).collect::<Vec<_>>(), 0..=len))
            }),
    ) {
        let (offsets, picked) = offsets;
        let conn = open_db_in_memory().unwrap();
        let service = service(&conn);
        service.import_rows(&rows(&offsets)).unwrap();
        let view = service.snapshot().unwrap();
        let ids = picked
            .iter()
            .filter_map(|index| view.ascending().nth(*index))
            .map(|entry| entry.id)
            .collect::<Vec<_>>();

        service.delete_entries(&ids).unwrap();

        let after = service.snapshot().unwrap();
        prop_assert_eq!(after.len(), offsets.len() - picked.len());
        prop_assert!(find_violations(&after).is_empty());
    }
}
