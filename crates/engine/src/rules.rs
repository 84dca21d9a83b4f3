use crate::model::{self, BlackoutRule, BlackoutScope};
use crate::store::{TeacherKey, TimetableStore};

// ---------------------------------------------------------------------------
// Blackout matching
// ---------------------------------------------------------------------------

/// First blackout rule (in declaration order) covering `(class_id, day,
/// period)`, or `None`. Unassigned lessons are never blackout-restricted.
///
/// Rules are not guaranteed disjoint; existence is all enforcement needs, and
/// the returned rule is used only for its description text.
pub fn is_blocked<'a>(
    store: &'a TimetableStore,
    class_id: &str,
    day: u8,
    period: u8,
) -> Option<&'a BlackoutRule> {
    if model::is_unassigned(class_id) {
        return None;
    }
    let grade = class_id.chars().next();
    store.blackout_rules().iter().find(|rule| {
        if !rule.days.contains(&day) || !rule.periods.contains(&period) {
            return false;
        }
        match rule.scope {
            BlackoutScope::All => true,
            BlackoutScope::Grade => grade.is_some_and(|g| rule.target == g.to_string()),
            BlackoutScope::Classes => {
                expand_class_list(&rule.target).iter().any(|t| t == class_id)
            }
        }
    })
}

/// Expand a class-list target expression into the class ids it names.
///
/// Tokens split on commas, fullwidth commas, ideographic commas, and
/// whitespace. A token `A-B` with numeric endpoints expands to the inclusive
/// range (empty when reversed); anything else is compared as a literal string.
pub fn expand_class_list(target: &str) -> Vec<String> {
    let mut out = Vec::new();
    for token in target.split(|c: char| c == ',' || c == '\u{ff0c}' || c == '\u{3001}' || c.is_whitespace())
    {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = token.split_once('-') {
            if let (Ok(lo), Ok(hi)) = (lo.trim().parse::<u32>(), hi.trim().parse::<u32>()) {
                out.extend((lo..=hi).map(|n| n.to_string()));
                continue;
            }
        }
        out.push(token.to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Slot availability
// ---------------------------------------------------------------------------

/// True when `(day, period)` is usable by the teacher for a lesson of
/// `class_id`: the teacher is free, the class is free, and no blackout rule
/// covers the slot. `exclude` carries ids of entries the caller has already
/// provisionally relocated, so hypothetical states can be evaluated without
/// mutating the store.
pub fn is_available(
    store: &TimetableStore,
    teacher: TeacherKey,
    class_id: &str,
    day: u8,
    period: u8,
    exclude: &[&str],
) -> bool {
    if store.teacher_busy(teacher, day, period, exclude) {
        return false;
    }
    if store.class_busy(class_id, day, period, exclude) {
        return false;
    }
    is_blocked(store, class_id, day, period).is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScheduleEntry, SchoolSnapshot, UNASSIGNED_CLASS};

    fn rule(id: &str, scope: BlackoutScope, target: &str, days: &[u8], periods: &[u8]) -> BlackoutRule {
        BlackoutRule {
            id: id.to_string(),
            scope,
            target: target.to_string(),
            days: days.to_vec(),
            periods: periods.to_vec(),
            desc: format!("rule {}", id),
        }
    }

    fn entry(id: &str, teacher: &str, class_id: &str, day: u8, period: u8) -> ScheduleEntry {
        ScheduleEntry {
            id: id.to_string(),
            teacher_name: teacher.to_string(),
            class_id: class_id.to_string(),
            subject: "lesson".to_string(),
            day,
            period,
        }
    }

    fn store(schedules: Vec<ScheduleEntry>, rules: Vec<BlackoutRule>) -> TimetableStore {
        TimetableStore::from_snapshot(SchoolSnapshot {
            teachers: vec![],
            classes: vec![],
            schedules,
            blackout_rules: rules,
            advisories: vec![],
            feature_flags: Default::default(),
            version: 0,
        })
        .unwrap()
    }

    #[test]
    fn expands_numeric_ranges() {
        assert_eq!(
            expand_class_list("101-105"),
            vec!["101", "102", "103", "104", "105"]
        );
        assert_eq!(expand_class_list("201,205"), vec!["201", "205"]);
    }

    #[test]
    fn splits_on_fullwidth_separators_and_whitespace() {
        assert_eq!(
            expand_class_list("201\u{ff0c}202\u{3001}203 204"),
            vec!["201", "202", "203", "204"]
        );
    }

    #[test]
    fn reversed_ranges_expand_to_nothing() {
        assert!(expand_class_list("105-101").is_empty());
    }

    #[test]
    fn non_numeric_range_tokens_stay_literal() {
        assert_eq!(expand_class_list("10a-105"), vec!["10a-105"]);
    }

    #[test]
    fn blocks_exactly_the_slots_a_rule_covers() {
        let st = store(
            vec![],
            vec![rule("c1", BlackoutScope::Classes, "101-105", &[0, 2], &[1, 2])],
        );

        for day in [0u8, 2] {
            for period in [1u8, 2] {
                assert!(is_blocked(&st, "103", day, period).is_some());
            }
        }
        assert!(is_blocked(&st, "103", 1, 1).is_none());
        assert!(is_blocked(&st, "103", 0, 3).is_none());
        assert!(is_blocked(&st, "106", 0, 1).is_none());
    }

    #[test]
    fn scope_all_covers_every_class() {
        let st = store(vec![], vec![rule("a1", BlackoutScope::All, "", &[4], &[9])]);
        assert!(is_blocked(&st, "101", 4, 9).is_some());
        assert!(is_blocked(&st, "312", 4, 9).is_some());
        assert!(is_blocked(&st, "101", 3, 9).is_none());
    }

    #[test]
    fn scope_grade_matches_the_first_character() {
        let st = store(vec![], vec![rule("g2", BlackoutScope::Grade, "2", &[1], &[6])]);
        assert!(is_blocked(&st, "201", 1, 6).is_some());
        assert!(is_blocked(&st, "215", 1, 6).is_some());
        assert!(is_blocked(&st, "101", 1, 6).is_none());
        assert!(is_blocked(&st, "301", 1, 6).is_none());
    }

    #[test]
    fn unassigned_class_is_never_blocked() {
        let st = store(vec![], vec![rule("a1", BlackoutScope::All, "", &[0], &[1])]);
        assert!(is_blocked(&st, UNASSIGNED_CLASS, 0, 1).is_none());
        assert!(is_blocked(&st, "", 0, 1).is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        let st = store(
            vec![],
            vec![
                rule("r1", BlackoutScope::Grade, "1", &[0], &[1]),
                rule("r2", BlackoutScope::All, "", &[0], &[1]),
            ],
        );
        assert_eq!(is_blocked(&st, "101", 0, 1).unwrap().id, "r1");
        assert_eq!(is_blocked(&st, "201", 0, 1).unwrap().id, "r2");
    }

    #[test]
    fn availability_requires_teacher_class_and_rules_clear() {
        let st = store(
            vec![
                entry("s1", "Lin", "101", 0, 1),
                entry("s2", "Wu", "102", 0, 2),
            ],
            vec![rule("a1", BlackoutScope::All, "", &[4], &[9])],
        );
        let lin = st.teacher_key("Lin").unwrap();
        let wu = st.teacher_key("Wu").unwrap();

        // Teacher occupied.
        assert!(!is_available(&st, lin, "103", 0, 1, &[]));
        // Class occupied.
        assert!(!is_available(&st, wu, "101", 0, 1, &[]));
        // Blackout-covered.
        assert!(!is_available(&st, lin, "103", 4, 9, &[]));
        // Clear.
        assert!(is_available(&st, lin, "103", 1, 1, &[]));
        // Exclusions make the occupied slot hypothetically free.
        assert!(is_available(&st, lin, "101", 0, 1, &["s1"]));
    }
}
