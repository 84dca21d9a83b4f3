use crate::model::AdvisoryRule;
use crate::store::TimetableStore;

// ---------------------------------------------------------------------------
// Advisory annotation
// ---------------------------------------------------------------------------

/// Label a destination slot with a soft warning ("domain time", "guidance
/// period") when it falls inside a weekly block informally reserved for a
/// subject area. Advisory only: the result never blocks a proposal, it is
/// attached for human review.
///
/// Matching is heuristic: the first rule whose day/period sets cover the slot
/// and whose keyword list is empty (campus-wide) or has a case-insensitive
/// substring hit against the teacher's domain + subject + name wins. False
/// positives and negatives are acceptable; the table is school configuration,
/// not engine logic.
///
/// Teachers not on the roster get no annotation -- there is nothing to match
/// keywords against.
pub fn advise(store: &TimetableStore, teacher_name: &str, day: u8, period: u8) -> Option<String> {
    let name = teacher_name.trim();
    if name.is_empty() {
        return None;
    }
    let teacher = store
        .teacher_key(name)
        .and_then(|key| store.roster_teacher(key))?;

    let haystack = format!(
        "{}{}{}",
        teacher.domain.trim(),
        teacher.subject.trim(),
        teacher.name.trim()
    )
    .to_lowercase();

    store.advisories().iter().find_map(|rule| {
        let day_covered = rule.days.is_empty() || rule.days.contains(&day);
        if !day_covered || !rule.periods.contains(&period) {
            return None;
        }
        let keyword_hit = rule.keywords.is_empty()
            || rule
                .keywords
                .iter()
                .any(|kw| haystack.contains(&kw.trim().to_lowercase()));
        keyword_hit.then(|| rule.label.clone())
    })
}

/// The conventional campus table, used when a snapshot omits its `advisories`
/// field: a campus-wide guidance block in the last period of every day, plus
/// per-day subject-domain blocks.
pub fn default_rules() -> Vec<AdvisoryRule> {
    fn rule(days: &[u8], periods: &[u8], keywords: &[&str], label: &str) -> AdvisoryRule {
        AdvisoryRule {
            days: days.to_vec(),
            periods: periods.to_vec(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            label: label.to_string(),
        }
    }

    vec![
        rule(&[], &[9], &[], "guidance period"),
        rule(&[0], &[6, 7, 8], &["chinese", "literature"], "domain time"),
        rule(&[1], &[6, 7, 8], &["english"], "domain time"),
        rule(
            &[1],
            &[1, 2],
            &[
                "arts",
                "music",
                "home economics",
                "technology",
                "health",
                "physical education",
                "counseling",
                "defense",
            ],
            "domain time",
        ),
        rule(
            &[3],
            &[1, 2, 3, 4],
            &["science", "physics", "chemistry", "biology"],
            "domain time",
        ),
        rule(
            &[3],
            &[6, 7, 8],
            &["math", "social studies", "history", "geography", "civics"],
            "domain time",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SchoolSnapshot, Teacher};

    fn teacher(name: &str, domain: &str, subject: &str) -> Teacher {
        Teacher {
            id: format!("T-{}", name),
            name: name.to_string(),
            domain: domain.to_string(),
            subject: subject.to_string(),
            order: 999,
            is_adjunct: false,
            is_homeroom: false,
            teaches_native: false,
        }
    }

    fn store(teachers: Vec<Teacher>, advisories: Vec<AdvisoryRule>) -> TimetableStore {
        TimetableStore::from_snapshot(SchoolSnapshot {
            teachers,
            classes: vec![],
            schedules: vec![],
            blackout_rules: vec![],
            advisories,
            feature_flags: Default::default(),
            version: 0,
        })
        .unwrap()
    }

    #[test]
    fn campus_wide_rule_labels_every_teacher() {
        let st = store(
            vec![teacher("Lin", "science", "physics")],
            default_rules(),
        );
        assert_eq!(advise(&st, "Lin", 2, 9).as_deref(), Some("guidance period"));
        assert_eq!(advise(&st, "Lin", 4, 9).as_deref(), Some("guidance period"));
    }

    #[test]
    fn keyword_rules_match_the_subject_area() {
        let st = store(
            vec![
                teacher("Lin", "science", "physics"),
                teacher("Wu", "language", "english"),
            ],
            default_rules(),
        );
        // Thu morning block is reserved for the science domain.
        assert_eq!(advise(&st, "Lin", 3, 2).as_deref(), Some("domain time"));
        assert_eq!(advise(&st, "Wu", 3, 2), None);
        // Tue afternoon block is reserved for english.
        assert_eq!(advise(&st, "Wu", 1, 7).as_deref(), Some("domain time"));
        assert_eq!(advise(&st, "Lin", 1, 7), None);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let st = store(
            vec![teacher("Chen", "Science", "Earth Science")],
            vec![AdvisoryRule {
                days: vec![2],
                periods: vec![3],
                keywords: vec!["earth science".to_string()],
                label: "domain time".to_string(),
            }],
        );
        assert_eq!(advise(&st, "Chen", 2, 3).as_deref(), Some("domain time"));
    }

    #[test]
    fn unknown_or_offroster_teachers_get_no_annotation() {
        let st = store(vec![teacher("Lin", "science", "physics")], default_rules());
        assert_eq!(advise(&st, "Nobody", 0, 9), None);
        assert_eq!(advise(&st, "", 0, 9), None);
    }

    #[test]
    fn names_are_trimmed_before_lookup() {
        let st = store(vec![teacher("Lin", "science", "physics")], default_rules());
        assert_eq!(
            advise(&st, "  Lin ", 0, 9).as_deref(),
            Some("guidance period")
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let st = store(
            vec![teacher("Lin", "science", "physics")],
            vec![
                AdvisoryRule {
                    days: vec![],
                    periods: vec![9],
                    keywords: vec![],
                    label: "guidance period".to_string(),
                },
                AdvisoryRule {
                    days: vec![0],
                    periods: vec![9],
                    keywords: vec!["science".to_string()],
                    label: "domain time".to_string(),
                },
            ],
        );
        assert_eq!(advise(&st, "Lin", 0, 9).as_deref(), Some("guidance period"));
    }

    #[test]
    fn empty_table_disables_all_advisories() {
        let st = store(vec![teacher("Lin", "science", "physics")], vec![]);
        assert_eq!(advise(&st, "Lin", 0, 9), None);
    }
}
