use log::debug;

use crate::model::{self, MoveAction, MoveProposal, ProposalKind};
use crate::rules;
use crate::store::{EntryRecord, TimetableStore};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no schedule entry with id '{0}'")]
    UnknownEntry(String),
    #[error("slot day {day} period {period} is not a schedulable slot")]
    BadSlot { day: u8, period: u8 },
    #[error("destination is a blackout slot: {0}")]
    Blocked(String),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze moving the given entry to `(day, period)` and return every
/// feasible rearrangement plan.
///
/// The search space is bounded by design: a direct move, a two-party swap
/// with the destination occupant, and three-party triangles within the
/// source's class. Longer cycles are rare in practice and their enumeration
/// cost grows combinatorially; administrators reach them through the manual
/// cyclic-swap planner instead.
///
/// A blackout-covered destination is rejected before any search, carrying the
/// rule's description so the caller can say why. When the search space is
/// exhausted a single disabled CONFLICT proposal is returned in place of an
/// error, so the caller can still render "why not" context.
pub fn evaluate_move(
    store: &TimetableStore,
    source_entry_id: &str,
    day: u8,
    period: u8,
) -> Result<Vec<MoveProposal>, PlanError> {
    if day >= model::DAY_COUNT || !model::is_schedulable_period(period) {
        return Err(PlanError::BadSlot { day, period });
    }
    let source = store
        .entry(source_entry_id)
        .ok_or_else(|| PlanError::UnknownEntry(source_entry_id.to_string()))?;
    if let Some(rule) = rules::is_blocked(store, &source.class_id, day, period) {
        return Err(PlanError::Blocked(rule.desc.clone()));
    }

    let proposals = generate(store, source, day, period);
    debug!(
        "evaluate_move {} -> {}: {} proposal(s)",
        source.id,
        model::slot_label(day, period),
        proposals.len()
    );
    Ok(proposals)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn generate(store: &TimetableStore, source: &EntryRecord, day: u8, period: u8) -> Vec<MoveProposal> {
    let version = store.version();
    let mut proposals = Vec::new();

    // The occupant lookup deliberately does not exclude the source itself: a
    // request to move an entry onto its own slot finds itself occupying the
    // destination and falls through to CONFLICT.
    let occupant = store.occupant_for_class(&source.class_id, day, period);

    match occupant {
        None => {
            if rules::is_available(
                store,
                source.teacher,
                &source.class_id,
                day,
                period,
                &[source.id.as_str()],
            ) {
                proposals.push(MoveProposal {
                    kind: ProposalKind::Move,
                    actions: vec![relocation(source, day, period)],
                    impact: "both teacher and class are free".to_string(),
                    disabled: false,
                    based_on_version: version,
                });
            }
        }
        Some(occupant) => {
            if occupant.teacher != source.teacher {
                let exclude = [source.id.as_str(), occupant.id.as_str()];
                let source_fits = rules::is_available(
                    store,
                    source.teacher,
                    &source.class_id,
                    day,
                    period,
                    &exclude,
                );
                let occupant_fits = rules::is_available(
                    store,
                    occupant.teacher,
                    &source.class_id,
                    source.day,
                    source.period,
                    &exclude,
                );
                if source_fits && occupant_fits {
                    proposals.push(MoveProposal {
                        kind: ProposalKind::Swap,
                        actions: vec![
                            relocation(source, day, period),
                            relocation(occupant, source.day, source.period),
                        ],
                        impact: "exact two-way exchange".to_string(),
                        disabled: false,
                        based_on_version: version,
                    });
                }
            }

            // Triangles: rotate through a third lesson of the same class. One
            // proposal per qualifying third entry; teachers must be pairwise
            // distinct.
            for third in store.entries() {
                if third.class_id != source.class_id {
                    continue;
                }
                if source.teacher == occupant.teacher
                    || occupant.teacher == third.teacher
                    || source.teacher == third.teacher
                {
                    continue;
                }
                if third.id == source.id || third.id == occupant.id {
                    continue;
                }
                let exclude = [
                    source.id.as_str(),
                    occupant.id.as_str(),
                    third.id.as_str(),
                ];
                let leg1 = rules::is_available(
                    store,
                    source.teacher,
                    &source.class_id,
                    day,
                    period,
                    &exclude,
                );
                let leg2 = rules::is_available(
                    store,
                    occupant.teacher,
                    &source.class_id,
                    third.day,
                    third.period,
                    &exclude,
                );
                let leg3 = rules::is_available(
                    store,
                    third.teacher,
                    &source.class_id,
                    source.day,
                    source.period,
                    &exclude,
                );
                if leg1 && leg2 && leg3 {
                    proposals.push(MoveProposal {
                        kind: ProposalKind::Triangle,
                        actions: vec![
                            relocation(source, day, period),
                            relocation(occupant, third.day, third.period),
                            relocation(third, source.day, source.period),
                        ],
                        impact: format!("three-way rotation within class {}", source.class_id),
                        disabled: false,
                        based_on_version: version,
                    });
                }
            }
        }
    }

    if proposals.is_empty() {
        proposals.push(MoveProposal {
            kind: ProposalKind::Conflict,
            actions: vec![],
            impact: format!(
                "no legal rearrangement reaches {}",
                model::slot_label(day, period)
            ),
            disabled: true,
            based_on_version: version,
        });
    }
    proposals
}

fn relocation(entry: &EntryRecord, new_day: u8, new_period: u8) -> MoveAction {
    MoveAction {
        entry_id: entry.id.clone(),
        teacher_name: entry.teacher_name.clone(),
        class_id: entry.class_id.clone(),
        new_day,
        new_period,
        old_day: entry.day,
        old_period: entry.period,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
