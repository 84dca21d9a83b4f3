use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Week / bell schedule constants
// ---------------------------------------------------------------------------

/// Number of teaching days in a week (Mon-Fri).
pub const DAY_COUNT: u8 = 5;

pub const DAY_NAMES: [&str; DAY_COUNT as usize] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Period code reserved for the lunch break. It appears in the bell schedule
/// for display purposes but is never schedulable and never stored in an entry.
pub const LUNCH_PERIOD: u8 = 5;

/// Sentinel class id for lessons without an assigned class.
pub const UNASSIGNED_CLASS: &str = "unknown";

/// Daily bell schedule: (period code, display label, start, end).
///
/// Display numbering skips the lunch break, so code 6 is shown as "Period 5".
pub const BELL_SCHEDULE: &[(u8, &str, &str, &str)] = &[
    (1, "Period 1", "08:10", "09:00"),
    (2, "Period 2", "09:10", "10:00"),
    (3, "Period 3", "10:10", "11:00"),
    (4, "Period 4", "11:10", "12:00"),
    (LUNCH_PERIOD, "Lunch", "12:00", "13:10"),
    (6, "Period 5", "13:10", "14:00"),
    (7, "Period 6", "14:10", "15:00"),
    (8, "Period 7", "15:10", "16:00"),
    (9, "Period 8", "16:10", "17:00"),
];

/// True for period codes that lessons may occupy (rejects lunch and codes
/// outside the bell schedule).
pub fn is_schedulable_period(period: u8) -> bool {
    period != LUNCH_PERIOD && BELL_SCHEDULE.iter().any(|&(id, _, _, _)| id == period)
}

pub fn period_label(period: u8) -> &'static str {
    BELL_SCHEDULE
        .iter()
        .find(|&&(id, _, _, _)| id == period)
        .map(|&(_, label, _, _)| label)
        .unwrap_or("?")
}

/// Wall-clock bounds of a period, from the bell schedule.
pub fn period_times(period: u8) -> Option<(NaiveTime, NaiveTime)> {
    let &(_, _, start, end) = BELL_SCHEDULE.iter().find(|&&(id, _, _, _)| id == period)?;
    let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
    Some((start, end))
}

pub fn day_name(day: u8) -> &'static str {
    DAY_NAMES.get(day as usize).copied().unwrap_or("?")
}

/// Human label for a slot, used in error messages and impact text.
pub fn slot_label(day: u8, period: u8) -> String {
    format!("{} {}", day_name(day), period_label(period))
}

/// True when a class id means "no class assigned". Unassigned lessons are
/// exempt from the class-uniqueness invariant and from blackout rules.
pub fn is_unassigned(class_id: &str) -> bool {
    class_id.trim().is_empty() || class_id == UNASSIGNED_CLASS
}

// ---------------------------------------------------------------------------
// Roster entities
// ---------------------------------------------------------------------------

/// One lesson occurrence in the weekly timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    /// Teacher display name; the natural key at the wire boundary. Internally
    /// the store resolves it to a surrogate `TeacherKey` on ingest.
    pub teacher_name: String,
    pub class_id: String,
    pub subject: String,
    /// 0-4, Mon-Fri.
    pub day: u8,
    /// Bell schedule period code; never the lunch break.
    pub period: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    /// Broad subject area, free text (e.g. "science").
    #[serde(default)]
    pub domain: String,
    /// Specific subject, free text.
    #[serde(default)]
    pub subject: String,
    /// Display/sort rank; unranked teachers sort last.
    #[serde(default = "default_order")]
    pub order: u32,
    #[serde(default)]
    pub is_adjunct: bool,
    #[serde(default)]
    pub is_homeroom: bool,
    #[serde(default)]
    pub teaches_native: bool,
}

fn default_order() -> u32 {
    999
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntity {
    /// Class code; the first character denotes the grade.
    pub id: String,
    pub name: String,
    pub grade: String,
}

// ---------------------------------------------------------------------------
// Blackout rules
// ---------------------------------------------------------------------------

/// What a blackout rule's `target` field applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlackoutScope {
    /// Whole school; target ignored.
    All,
    /// Target is a grade digit compared against the class id's first character.
    Grade,
    /// Target is a class-list expression ("201, 205" or "101-105").
    Classes,
}

/// A named, time-scoped restriction. Administered externally; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackoutRule {
    pub id: String,
    #[serde(rename = "type")]
    pub scope: BlackoutScope,
    pub target: String,
    pub days: Vec<u8>,
    pub periods: Vec<u8>,
    /// Human label shown when a move is blocked.
    pub desc: String,
}

// ---------------------------------------------------------------------------
// Advisory rules (soft, non-blocking)
// ---------------------------------------------------------------------------

/// One row of the domain-time advisory table. Advisories label a slot for
/// human review; they never block a move. School policy, carried as
/// configuration in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRule {
    /// Day indices the rule covers; empty means every day.
    #[serde(default)]
    pub days: Vec<u8>,
    pub periods: Vec<u8>,
    /// Case-insensitive substrings matched against the teacher's
    /// domain + subject + name; empty means campus-wide (every teacher).
    #[serde(default)]
    pub keywords: Vec<String>,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Snapshot document
// ---------------------------------------------------------------------------

/// UI-facing toggles persisted with the document. The engine carries them
/// verbatim; it never interprets them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(default = "default_true")]
    pub apply_enabled: bool,
    #[serde(default = "default_true")]
    pub sim_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            apply_enabled: true,
            sim_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// The full persisted document for one school. The live state feed replaces
/// it wholesale; persistence overwrites it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSnapshot {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub classes: Vec<ClassEntity>,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    pub blackout_rules: Vec<BlackoutRule>,
    /// Omitted field -> the conventional campus table; explicit empty list
    /// disables all advisories.
    #[serde(default = "crate::advisory::default_rules")]
    pub advisories: Vec<AdvisoryRule>,
    #[serde(default)]
    pub feature_flags: FeatureFlags,
    /// Monotonic document stamp, bumped on every applied change.
    #[serde(default)]
    pub version: u64,
}

// ---------------------------------------------------------------------------
// Proposals and rotation plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalKind {
    Move,
    Swap,
    Triangle,
    Conflict,
}

/// One relocation within a proposal or plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAction {
    pub entry_id: String,
    pub teacher_name: String,
    pub class_id: String,
    pub new_day: u8,
    pub new_period: u8,
    pub old_day: u8,
    pub old_period: u8,
}

/// A candidate rearrangement. Ephemeral: generated per analysis request,
/// discarded once applied or cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveProposal {
    #[serde(rename = "type")]
    pub kind: ProposalKind,
    pub actions: Vec<MoveAction>,
    /// Short human description of the effect.
    pub impact: String,
    /// Set only on CONFLICT placeholders; disabled proposals cannot be applied.
    #[serde(default)]
    pub disabled: bool,
    /// Store version the proposal was generated against.
    pub based_on_version: u64,
}

/// One stop on an administrator-built rotation path. `entry_id` names the
/// lesson currently occupying the slot; `None` marks a genuinely empty slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapStop {
    pub day: u8,
    pub period: u8,
    #[serde(default)]
    pub entry_id: Option<String>,
}

/// Validated output of the cyclic-swap planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationPlan {
    pub actions: Vec<MoveAction>,
    pub based_on_version: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lunch_is_never_schedulable() {
        assert!(!is_schedulable_period(LUNCH_PERIOD));
        for &(id, _, _, _) in BELL_SCHEDULE {
            assert_eq!(is_schedulable_period(id), id != LUNCH_PERIOD);
        }
        assert!(!is_schedulable_period(0));
        assert!(!is_schedulable_period(10));
    }

    #[test]
    fn display_numbering_skips_lunch() {
        assert_eq!(period_label(4), "Period 4");
        assert_eq!(period_label(6), "Period 5");
        assert_eq!(period_label(9), "Period 8");
    }

    #[test]
    fn period_times_come_from_the_bell_schedule() {
        let (start, end) = period_times(1).unwrap();
        assert_eq!(start, NaiveTime::from_hms_opt(8, 10, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(period_times(12).is_none());
    }

    #[test]
    fn unassigned_class_sentinels() {
        assert!(is_unassigned(UNASSIGNED_CLASS));
        assert!(is_unassigned(""));
        assert!(is_unassigned("  "));
        assert!(!is_unassigned("101"));
    }

    #[test]
    fn snapshot_defaults() {
        let snap: SchoolSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snap.feature_flags.apply_enabled);
        assert!(snap.feature_flags.sim_enabled);
        assert_eq!(snap.version, 0);
        // Omitted advisories fall back to the conventional campus table.
        assert!(!snap.advisories.is_empty());

        let snap: SchoolSnapshot = serde_json::from_str(r#"{"advisories":[]}"#).unwrap();
        assert!(snap.advisories.is_empty());
    }

    #[test]
    fn proposal_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProposalKind::Triangle).unwrap(),
            r#""TRIANGLE""#
        );
        let kind: ProposalKind = serde_json::from_str(r#""MOVE""#).unwrap();
        assert_eq!(kind, ProposalKind::Move);
    }
}
