use log::{info, warn};

use crate::model::{MoveAction, MoveProposal, ProposalKind, RotationPlan, SchoolSnapshot};
use crate::store::TimetableStore;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PersistError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("a disabled proposal cannot be applied")]
    Disabled,
    #[error("no schedule entry with id '{0}'")]
    UnknownEntry(String),
    #[error("the timetable changed since this plan was computed (plan version {based_on}, store version {current}) -- re-run the analysis")]
    Stale { based_on: u64, current: u64 },
    #[error("persisting the timetable failed, nothing was changed -- retry: {0}")]
    Persist(String),
}

// ---------------------------------------------------------------------------
// Apply policy (pluggable admission check)
// ---------------------------------------------------------------------------

/// Decides whether a plan computed against an earlier store state may still
/// be applied. Swapping the policy never changes the planners' contracts.
pub trait ApplyPolicy {
    fn admit(&self, store: &TimetableStore, based_on_version: u64) -> Result<(), ApplyError>;
}

/// Always admits. This reproduces the full-document-overwrite behavior of
/// the persistence layer: a plan computed against snapshot T applies cleanly
/// against snapshot T', and the last writer wins. The race is a documented
/// property of the system, not an accident of this implementation.
pub struct LastWriterWins;

impl ApplyPolicy for LastWriterWins {
    fn admit(&self, _store: &TimetableStore, _based_on_version: u64) -> Result<(), ApplyError> {
        Ok(())
    }
}

/// Compare-and-swap on the document version: admits only plans computed
/// against the store's current state.
pub struct VersionChecked;

impl ApplyPolicy for VersionChecked {
    fn admit(&self, store: &TimetableStore, based_on_version: u64) -> Result<(), ApplyError> {
        if based_on_version != store.version() {
            return Err(ApplyError::Stale {
                based_on: based_on_version,
                current: store.version(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot writer (external persist boundary)
// ---------------------------------------------------------------------------

/// The external persist call: replaces the entire stored document. No
/// field-level transaction exists at this boundary.
pub trait SnapshotWriter {
    fn persist(&mut self, snapshot: &SchoolSnapshot) -> Result<(), PersistError>;
}

/// In-process writer; keeps the last persisted document.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub last: Option<SchoolSnapshot>,
}

impl SnapshotWriter for MemoryWriter {
    fn persist(&mut self, snapshot: &SchoolSnapshot) -> Result<(), PersistError> {
        self.last = Some(snapshot.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Apply a set of relocations: admission check, mutate a scratch copy, bump
/// the version, persist the full document, then commit to the caller's
/// store. A failed persist leaves the caller-visible store untouched, so the
/// operation is atomic from the caller's point of view and always safe to
/// retry against a fresh snapshot.
pub fn apply(
    store: &mut TimetableStore,
    actions: &[MoveAction],
    based_on_version: u64,
    policy: &dyn ApplyPolicy,
    writer: &mut dyn SnapshotWriter,
) -> Result<SchoolSnapshot, ApplyError> {
    policy.admit(store, based_on_version)?;

    let mut next = store.clone();
    for action in actions {
        if !next.relocate(&action.entry_id, action.new_day, action.new_period) {
            return Err(ApplyError::UnknownEntry(action.entry_id.clone()));
        }
    }
    next.bump_version();

    let snapshot = next.to_snapshot();
    if let Err(err) = writer.persist(&snapshot) {
        warn!("persist failed, keeping the pre-apply state: {err}");
        return Err(ApplyError::Persist(err.to_string()));
    }

    info!(
        "applied {} relocation(s), version {} -> {}",
        actions.len(),
        store.version(),
        next.version()
    );
    *store = next;
    Ok(snapshot)
}

/// Apply one proposal picked by the user. CONFLICT placeholders are
/// explanatory and refuse to apply.
pub fn apply_proposal(
    store: &mut TimetableStore,
    proposal: &MoveProposal,
    policy: &dyn ApplyPolicy,
    writer: &mut dyn SnapshotWriter,
) -> Result<SchoolSnapshot, ApplyError> {
    if proposal.disabled || proposal.kind == ProposalKind::Conflict {
        return Err(ApplyError::Disabled);
    }
    apply(
        store,
        &proposal.actions,
        proposal.based_on_version,
        policy,
        writer,
    )
}

/// Apply a validated rotation plan.
pub fn apply_plan(
    store: &mut TimetableStore,
    plan: &RotationPlan,
    policy: &dyn ApplyPolicy,
    writer: &mut dyn SnapshotWriter,
) -> Result<SchoolSnapshot, ApplyError> {
    apply(store, &plan.actions, plan.based_on_version, policy, writer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
