//! Batch deletion resolver.
//!
//! # Responsibility
//! - Group an arbitrary selection into maximal runs of adjacent ledger
//!   positions ("batches").
//! - Merge each batch's cycle lengths onto the surviving successor.
//!
//! # Invariants
//! - Grouping uses positions in the most-recent-first view, never raw ids.
//! - A batch's successor is never part of the selection.
//! - A batch containing the earliest entry leaves its successor as the new
//!   earliest entry, with `cycle_length == None`.

use crate::ledger::view::LedgerView;
use crate::ledger::{LedgerError, LedgerResult};
use crate::model::entry::EntryId;
use crate::repo::entry_store::EntryStore;
use serde::Serialize;

/// New cycle length for the survivor directly after one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessorUpdate {
    pub entry_id: EntryId,
    pub previous: Option<u32>,
    pub cycle_length: Option<u32>,
}

/// One maximal run of adjacent selected entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionBatch {
    /// Members, most recent first.
    pub members: Vec<EntryId>,
    /// `None` when the batch includes the most recent ledger entry.
    pub successor: Option<SuccessorUpdate>,
}

/// Resolved deletion: every batch plus the flat list of ids to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    pub batches: Vec<DeletionBatch>,
    pub doomed: Vec<EntryId>,
}

impl DeletionPlan {
    pub fn is_empty(&self) -> bool {
        self.doomed.is_empty()
    }

    pub fn successor_updates(&self) -> impl Iterator<Item = &SuccessorUpdate> {
        self.batches.iter().filter_map(|batch| batch.successor.as_ref())
    }
}

/// Resolves `selection` against `view` without touching storage.
///
/// Duplicate ids collapse. An id missing from the view fails the whole plan.
pub fn plan_deletion(view: &LedgerView, selection: &[EntryId]) -> LedgerResult<DeletionPlan> {
    let mut positions = selection
        .iter()
        .map(|id| {
            view.descending_position(*id)
                .ok_or(LedgerError::EntryNotFound(*id))
        })
        .collect::<LedgerResult<Vec<_>>>()?;
    positions.sort_unstable();
    positions.dedup();

    let earliest_position = view.len().saturating_sub(1);
    let mut plan = DeletionPlan::default();
    for run in contiguous_runs(&positions) {
        let members = run
            .iter()
            .filter_map(|position| view.at_descending(*position))
            .collect::<Vec<_>>();

        let successor = run
            .first()
            .and_then(|most_recent| most_recent.checked_sub(1))
            .and_then(|position| view.at_descending(position))
            .map(|survivor| {
                let cycle_length = if run.contains(&earliest_position) {
                    None
                } else {
                    let merged = members
                        .iter()
                        .map(|member| member.cycle_length.unwrap_or(0))
                        .fold(survivor.cycle_length.unwrap_or(0), u32::saturating_add);
                    Some(merged)
                };
                SuccessorUpdate {
                    entry_id: survivor.id,
                    previous: survivor.cycle_length,
                    cycle_length,
                }
            });

        let member_ids = members.iter().map(|member| member.id).collect::<Vec<_>>();
        plan.doomed.extend(member_ids.iter().copied());
        plan.batches.push(DeletionBatch {
            members: member_ids,
            successor,
        });
    }

    Ok(plan)
}

/// Writes the successor updates and removes every doomed entry.
///
/// Must run inside the same transaction the plan was computed in.
pub fn apply_deletion_plan<S: EntryStore + ?Sized>(
    store: &S,
    plan: &DeletionPlan,
) -> LedgerResult<usize> {
    for update in plan.successor_updates() {
        store.update_cycle_length(update.entry_id, update.cycle_length)?;
    }
    Ok(store.delete_many(&plan.doomed)?)
}

/// Loads a snapshot, resolves `selection` and applies the plan.
pub fn delete_entries<S: EntryStore + ?Sized>(
    store: &S,
    selection: &[EntryId],
) -> LedgerResult<DeletionPlan> {
    let view = LedgerView::load(store)?;
    let plan = plan_deletion(&view, selection)?;
    apply_deletion_plan(store, &plan)?;
    Ok(plan)
}

fn contiguous_runs(sorted_positions: &[usize]) -> Vec<&[usize]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for index in 1..=sorted_positions.len() {
        let breaks = index == sorted_positions.len()
            || sorted_positions[index] != sorted_positions[index - 1] + 1;
        if breaks {
            runs.push(&sorted_positions[start..index]);
            start = index;
        }
    }
    runs
}
