use std::collections::{HashMap, HashSet};

use crate::model::{
    self, AdvisoryRule, BlackoutRule, ClassEntity, FeatureFlags, ScheduleEntry, SchoolSnapshot,
    Teacher,
};

// ---------------------------------------------------------------------------
// Surrogate teacher key
// ---------------------------------------------------------------------------

/// Stable surrogate key for a teacher within one store. The wire format joins
/// entities on the teacher's display name; that translation happens once, on
/// snapshot ingest, and every internal comparison uses this key instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeacherKey(u32);

/// A schedule entry with its teacher name resolved to a surrogate key.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub id: String,
    pub teacher: TeacherKey,
    /// Trimmed display name, kept for proposals and error messages.
    pub teacher_name: String,
    pub class_id: String,
    pub subject: String,
    pub day: u8,
    pub period: u8,
}

// ---------------------------------------------------------------------------
// Ingest errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("entry '{0}' has day {1} -- days run 0 (Mon) through 4 (Fri)")]
    DayOutOfRange(String, u8),
    #[error("entry '{0}' has period {1} which is not a schedulable period")]
    BadPeriod(String, u8),
    #[error("duplicate entry id '{0}'")]
    DuplicateId(String),
    #[error("teacher '{teacher}' is booked twice on {slot}")]
    TeacherDoubleBooked { teacher: String, slot: String },
    #[error("class {class_id} is booked twice on {slot}")]
    ClassDoubleBooked { class_id: String, slot: String },
}

// ---------------------------------------------------------------------------
// Timetable store
// ---------------------------------------------------------------------------

/// In-memory unit of truth for one school. Built from a wire snapshot,
/// queried by the evaluator and planners, mutated only by the apply step.
///
/// The store is an explicit value: every engine operation is a pure function
/// of `(store, request)`, and callers clone it when they need a scratch copy.
#[derive(Debug, Clone)]
pub struct TimetableStore {
    teachers: Vec<Teacher>,
    classes: Vec<ClassEntity>,
    entries: Vec<EntryRecord>,
    blackout_rules: Vec<BlackoutRule>,
    advisories: Vec<AdvisoryRule>,
    feature_flags: FeatureFlags,
    version: u64,
    keys_by_name: HashMap<String, TeacherKey>,
    roster_by_key: HashMap<TeacherKey, usize>,
}

impl TimetableStore {
    /// Ingest a wire snapshot, resolving teacher names to surrogate keys and
    /// enforcing the store invariants (valid slots, unique ids, no
    /// double-booking; unassigned classes are exempt from class uniqueness).
    pub fn from_snapshot(snapshot: SchoolSnapshot) -> Result<Self, SnapshotError> {
        let mut keys_by_name: HashMap<String, TeacherKey> = HashMap::new();
        let mut roster_by_key: HashMap<TeacherKey, usize> = HashMap::new();
        let mut next_key = 0u32;
        let mut key_for = |name: &str, keys: &mut HashMap<String, TeacherKey>| {
            let trimmed = name.trim().to_string();
            *keys.entry(trimmed).or_insert_with(|| {
                let key = TeacherKey(next_key);
                next_key += 1;
                key
            })
        };

        // Roster teachers first, so roster metadata wins the key. Duplicate
        // names collapse onto one key; the first roster row keeps it.
        for (i, teacher) in snapshot.teachers.iter().enumerate() {
            let key = key_for(&teacher.name, &mut keys_by_name);
            roster_by_key.entry(key).or_insert(i);
        }

        let mut entries = Vec::with_capacity(snapshot.schedules.len());
        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut teacher_slots: HashSet<(TeacherKey, u8, u8)> = HashSet::new();
        let mut class_slots: HashSet<(String, u8, u8)> = HashSet::new();

        for entry in &snapshot.schedules {
            if entry.day >= model::DAY_COUNT {
                return Err(SnapshotError::DayOutOfRange(entry.id.clone(), entry.day));
            }
            if !model::is_schedulable_period(entry.period) {
                return Err(SnapshotError::BadPeriod(entry.id.clone(), entry.period));
            }
            if !seen_ids.insert(entry.id.as_str()) {
                return Err(SnapshotError::DuplicateId(entry.id.clone()));
            }

            let key = key_for(&entry.teacher_name, &mut keys_by_name);
            if !teacher_slots.insert((key, entry.day, entry.period)) {
                return Err(SnapshotError::TeacherDoubleBooked {
                    teacher: entry.teacher_name.trim().to_string(),
                    slot: model::slot_label(entry.day, entry.period),
                });
            }
            if !model::is_unassigned(&entry.class_id)
                && !class_slots.insert((entry.class_id.clone(), entry.day, entry.period))
            {
                return Err(SnapshotError::ClassDoubleBooked {
                    class_id: entry.class_id.clone(),
                    slot: model::slot_label(entry.day, entry.period),
                });
            }

            entries.push(EntryRecord {
                id: entry.id.clone(),
                teacher: key,
                teacher_name: entry.teacher_name.trim().to_string(),
                class_id: entry.class_id.clone(),
                subject: entry.subject.clone(),
                day: entry.day,
                period: entry.period,
            });
        }

        Ok(TimetableStore {
            teachers: snapshot.teachers,
            classes: snapshot.classes,
            entries,
            blackout_rules: snapshot.blackout_rules,
            advisories: snapshot.advisories,
            feature_flags: snapshot.feature_flags,
            version: snapshot.version,
            keys_by_name,
            roster_by_key,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    pub fn blackout_rules(&self) -> &[BlackoutRule] {
        &self.blackout_rules
    }

    pub fn advisories(&self) -> &[AdvisoryRule] {
        &self.advisories
    }

    pub fn feature_flags(&self) -> FeatureFlags {
        self.feature_flags
    }

    /// Surrogate key for a teacher name, if the name appears on the roster or
    /// in any schedule entry. Names are trimmed before lookup.
    pub fn teacher_key(&self, name: &str) -> Option<TeacherKey> {
        self.keys_by_name.get(name.trim()).copied()
    }

    /// Roster record behind a key. `None` for names that only appear in
    /// schedule entries.
    pub fn roster_teacher(&self, key: TeacherKey) -> Option<&Teacher> {
        self.roster_by_key.get(&key).map(|&i| &self.teachers[i])
    }

    pub fn entry(&self, id: &str) -> Option<&EntryRecord> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The entry occupying `(class_id, day, period)`, if any.
    pub fn occupant_for_class(&self, class_id: &str, day: u8, period: u8) -> Option<&EntryRecord> {
        self.entries
            .iter()
            .find(|e| e.class_id == class_id && e.day == day && e.period == period)
    }

    /// True when the teacher already has a lesson at the slot, ignoring the
    /// excluded entry ids (entries provisionally relocated by the caller).
    pub fn teacher_busy(&self, teacher: TeacherKey, day: u8, period: u8, exclude: &[&str]) -> bool {
        self.entries.iter().any(|e| {
            e.teacher == teacher
                && e.day == day
                && e.period == period
                && !exclude.contains(&e.id.as_str())
        })
    }

    /// True when the class already has a lesson at the slot, ignoring the
    /// excluded entry ids.
    pub fn class_busy(&self, class_id: &str, day: u8, period: u8, exclude: &[&str]) -> bool {
        self.entries.iter().any(|e| {
            e.class_id == class_id
                && e.day == day
                && e.period == period
                && !exclude.contains(&e.id.as_str())
        })
    }

    // -----------------------------------------------------------------------
    // Mutation (apply step only)
    // -----------------------------------------------------------------------

    /// Move an entry to a new slot. Returns false for unknown ids. Only day
    /// and period ever change; identity fields are immutable after ingest.
    pub(crate) fn relocate(&mut self, entry_id: &str, day: u8, period: u8) -> bool {
        match self.entries.iter_mut().find(|e| e.id == entry_id) {
            Some(entry) => {
                entry.day = day;
                entry.period = period;
                true
            }
            None => false,
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Write the store back out as a full wire document.
    pub fn to_snapshot(&self) -> SchoolSnapshot {
        SchoolSnapshot {
            teachers: self.teachers.clone(),
            classes: self.classes.clone(),
            schedules: self
                .entries
                .iter()
                .map(|e| ScheduleEntry {
                    id: e.id.clone(),
                    teacher_name: e.teacher_name.clone(),
                    class_id: e.class_id.clone(),
                    subject: e.subject.clone(),
                    day: e.day,
                    period: e.period,
                })
                .collect(),
            blackout_rules: self.blackout_rules.clone(),
            advisories: self.advisories.clone(),
            feature_flags: self.feature_flags,
            version: self.version,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
