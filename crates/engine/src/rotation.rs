use log::debug;

use crate::model::{self, MoveAction, RotationPlan, SwapStop};
use crate::rules;
use crate::store::{EntryRecord, TimetableStore};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("a rotation needs at least two slots, got {0}")]
    TooShort(usize),
    #[error("slot day {day} period {period} is not a schedulable slot")]
    BadSlot { day: u8, period: u8 },
    #[error("slot {0} appears twice in the rotation path")]
    DuplicateSlot(String),
    #[error("no schedule entry with id '{0}'")]
    UnknownEntry(String),
    #[error("entry '{entry_id}' is at {actual}, not at the queued slot {queued}")]
    SlotMismatch {
        entry_id: String,
        queued: String,
        actual: String,
    },
    #[error("{teacher} or class {class_id} is not free on {slot}")]
    Conflict {
        teacher: String,
        class_id: String,
        slot: String,
    },
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Validate an administrator-ordered rotation path and compute the N-way
/// cyclic reassignment: every occupied stop moves to the next slot in the
/// path, the last wrapping around to the first. Empty stops simply become
/// (or remain) empty.
///
/// Every availability check excludes *all* entries on the path, so the
/// verdict describes the final rotated state rather than any transient one.
/// Planning never mutates the store; a failed check aborts with the
/// offending teacher, class, and slot, and nothing changes.
pub fn plan_cyclic_swap(
    store: &TimetableStore,
    queue: &[SwapStop],
) -> Result<RotationPlan, RotationError> {
    if queue.len() < 2 {
        return Err(RotationError::TooShort(queue.len()));
    }
    for stop in queue {
        if stop.day >= model::DAY_COUNT || !model::is_schedulable_period(stop.period) {
            return Err(RotationError::BadSlot {
                day: stop.day,
                period: stop.period,
            });
        }
    }
    for (i, stop) in queue.iter().enumerate() {
        if queue[i + 1..]
            .iter()
            .any(|other| other.day == stop.day && other.period == stop.period)
        {
            return Err(RotationError::DuplicateSlot(model::slot_label(
                stop.day,
                stop.period,
            )));
        }
    }

    let mut occupants: Vec<Option<&EntryRecord>> = Vec::with_capacity(queue.len());
    for stop in queue {
        match &stop.entry_id {
            Some(id) => {
                let entry = store
                    .entry(id)
                    .ok_or_else(|| RotationError::UnknownEntry(id.clone()))?;
                if entry.day != stop.day || entry.period != stop.period {
                    return Err(RotationError::SlotMismatch {
                        entry_id: id.clone(),
                        queued: model::slot_label(stop.day, stop.period),
                        actual: model::slot_label(entry.day, entry.period),
                    });
                }
                occupants.push(Some(entry));
            }
            None => occupants.push(None),
        }
    }

    let affected: Vec<&str> = occupants
        .iter()
        .flatten()
        .map(|e| e.id.as_str())
        .collect();

    for (i, occupant) in occupants.iter().enumerate() {
        let Some(entry) = occupant else { continue };
        let next = &queue[(i + 1) % queue.len()];
        if !rules::is_available(
            store,
            entry.teacher,
            &entry.class_id,
            next.day,
            next.period,
            &affected,
        ) {
            return Err(RotationError::Conflict {
                teacher: entry.teacher_name.clone(),
                class_id: entry.class_id.clone(),
                slot: model::slot_label(next.day, next.period),
            });
        }
    }

    let actions: Vec<MoveAction> = occupants
        .iter()
        .enumerate()
        .filter_map(|(i, occupant)| {
            occupant.map(|entry| {
                let next = &queue[(i + 1) % queue.len()];
                MoveAction {
                    entry_id: entry.id.clone(),
                    teacher_name: entry.teacher_name.clone(),
                    class_id: entry.class_id.clone(),
                    new_day: next.day,
                    new_period: next.period,
                    old_day: entry.day,
                    old_period: entry.period,
                }
            })
        })
        .collect();

    debug!(
        "rotation over {} stop(s): {} entr(y/ies) move",
        queue.len(),
        actions.len()
    );
    Ok(RotationPlan {
        actions,
        based_on_version: store.version(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
