//! Ordinal-sequence checks for sibling rows.
//!
//! Siblings share a parent (a workout, an exercise instance or a template)
//! and each carries an ordinal that should form `1..=N` exactly once.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::db::models::{ExerciseInstance, ExerciseSet, TemplateExercise};
use crate::integrity::Severity;

/// Which ordinal column a group of siblings is numbered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SiblingKind {
    /// `exercise_instances.order_in_workout` within a workout.
    WorkoutExercises,
    /// `exercise_sets.set_number` within an exercise instance.
    InstanceSets,
    /// `template_exercises.order_in_template` within a template.
    TemplateExercises,
}

impl SiblingKind {
    pub fn table(&self) -> &'static str {
        match self {
            SiblingKind::WorkoutExercises => "exercise_instances",
            SiblingKind::InstanceSets => "exercise_sets",
            SiblingKind::TemplateExercises => "template_exercises",
        }
    }

    pub fn ordinal_column(&self) -> &'static str {
        match self {
            SiblingKind::WorkoutExercises => "order_in_workout",
            SiblingKind::InstanceSets => "set_number",
            SiblingKind::TemplateExercises => "order_in_template",
        }
    }

    pub fn parent_table(&self) -> &'static str {
        match self {
            SiblingKind::WorkoutExercises => "workouts",
            SiblingKind::InstanceSets => "exercise_instances",
            SiblingKind::TemplateExercises => "workout_templates",
        }
    }
}

/// A row numbered among its siblings.
pub trait Ordered {
    const KIND: SiblingKind;

    fn record_id(&self) -> i64;
    fn parent_id(&self) -> i64;
    fn ordinal(&self) -> i64;
}

impl<T: Ordered> Ordered for &T {
    const KIND: SiblingKind = T::KIND;

    fn record_id(&self) -> i64 {
        T::record_id(*self)
    }

    fn parent_id(&self) -> i64 {
        T::parent_id(*self)
    }

    fn ordinal(&self) -> i64 {
        T::ordinal(*self)
    }
}

impl Ordered for ExerciseInstance {
    const KIND: SiblingKind = SiblingKind::WorkoutExercises;

    fn record_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.workout_id
    }

    fn ordinal(&self) -> i64 {
        self.order_in_workout
    }
}

impl Ordered for ExerciseSet {
    const KIND: SiblingKind = SiblingKind::InstanceSets;

    fn record_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.exercise_instance_id
    }

    fn ordinal(&self) -> i64 {
        self.set_number
    }
}

impl Ordered for TemplateExercise {
    const KIND: SiblingKind = SiblingKind::TemplateExercises;

    fn record_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.template_id
    }

    fn ordinal(&self) -> i64 {
        self.order_in_template
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceIssue {
    /// No sibling holds any ordinal strictly between `after` and `before`.
    /// `after` is 0 when the sequence does not start at 1.
    Gap { after: i64, before: i64 },
    /// Several siblings share `ordinal`; their relative order is ambiguous.
    Duplicate { ordinal: i64, record_ids: Vec<i64> },
    /// Ordinals must be positive.
    NonPositive { ordinal: i64, record_id: i64 },
}

impl SequenceIssue {
    pub fn severity(&self) -> Severity {
        match self {
            SequenceIssue::Gap { .. } => Severity::Warning,
            SequenceIssue::Duplicate { .. } | SequenceIssue::NonPositive { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for SequenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceIssue::Gap { after, before } => {
                write!(f, "gap between {} and {}", after, before)
            }
            SequenceIssue::Duplicate {
                ordinal,
                record_ids,
            } => write!(f, "ordinal {} shared by records {:?}", ordinal, record_ids),
            SequenceIssue::NonPositive { ordinal, record_id } => {
                write!(f, "record {} has non-positive ordinal {}", record_id, ordinal)
            }
        }
    }
}

/// Reports every way `siblings` differs from `1..=N` with each value once.
pub fn check_sequence<T: Ordered>(siblings: &[T]) -> Vec<SequenceIssue> {
    let mut by_ordinal: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for sibling in siblings {
        by_ordinal
            .entry(sibling.ordinal())
            .or_default()
            .push(sibling.record_id());
    }

    let mut issues = Vec::new();

    for (&ordinal, ids) in by_ordinal.range(..1) {
        for &record_id in ids {
            issues.push(SequenceIssue::NonPositive { ordinal, record_id });
        }
    }

    let mut previous = 0;
    for &ordinal in by_ordinal.keys().filter(|&&o| o >= 1) {
        if ordinal != previous + 1 {
            issues.push(SequenceIssue::Gap {
                after: previous,
                before: ordinal,
            });
        }
        previous = ordinal;
    }

    for (&ordinal, ids) in &by_ordinal {
        if ids.len() > 1 {
            issues.push(SequenceIssue::Duplicate {
                ordinal,
                record_ids: ids.clone(),
            });
        }
    }

    issues
}

/// One ordinal rewrite produced by [`plan_renumbering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Renumbering {
    pub record_id: i64,
    pub from: i64,
    pub to: i64,
}

/// Assigns `1, 2, 3, ...` in current-ordinal order and returns only the rows
/// whose ordinal changes. The sort is stable: siblings sharing an ordinal keep
/// the order they were passed in, which for rows loaded by the store is row-id
/// order. An already contiguous sequence yields no changes.
pub fn plan_renumbering<T: Ordered>(siblings: &[T]) -> Vec<Renumbering> {
    let mut ordered: Vec<&T> = siblings.iter().collect();
    ordered.sort_by_key(|s| s.ordinal());

    ordered
        .into_iter()
        .zip(1..)
        .filter(|(sibling, to)| sibling.ordinal() != *to)
        .map(|(sibling, to)| Renumbering {
            record_id: sibling.record_id(),
            from: sibling.ordinal(),
            to,
        })
        .collect()
}

/// Splits rows into sibling groups keyed by parent id.
pub fn group_by_parent<T: Ordered>(rows: &[T]) -> BTreeMap<i64, Vec<&T>> {
    let mut groups: BTreeMap<i64, Vec<&T>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.parent_id()).or_default().push(row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        id: i64,
        ordinal: i64,
    }

    impl Ordered for Slot {
        const KIND: SiblingKind = SiblingKind::InstanceSets;

        fn record_id(&self) -> i64 {
            self.id
        }

        fn parent_id(&self) -> i64 {
            1
        }

        fn ordinal(&self) -> i64 {
            self.ordinal
        }
    }

    fn slots(ordinals: &[i64]) -> Vec<Slot> {
        ordinals
            .iter()
            .enumerate()
            .map(|(i, &ordinal)| Slot {
                id: i as i64 + 1,
                ordinal,
            })
            .collect()
    }

    fn repaired(siblings: &[Slot]) -> Vec<Slot> {
        let plan = plan_renumbering(siblings);
        siblings
            .iter()
            .map(|s| Slot {
                id: s.id,
                ordinal: plan
                    .iter()
                    .find(|r| r.record_id == s.id)
                    .map(|r| r.to)
                    .unwrap_or(s.ordinal),
            })
            .collect()
    }

    fn ordinals(siblings: &[Slot]) -> Vec<i64> {
        siblings.iter().map(|s| s.ordinal).collect()
    }

    #[test]
    fn empty_siblings_have_no_issues() {
        assert!(check_sequence::<Slot>(&[]).is_empty());
        assert!(plan_renumbering::<Slot>(&[]).is_empty());
    }

    #[test]
    fn permutations_are_clean() {
        let mut rng = rand::rng();
        for n in 1..=12 {
            let mut values: Vec<i64> = (1..=n).collect();
            for _ in 0..5 {
                values.shuffle(&mut rng);
                let siblings = slots(&values);
                assert!(check_sequence(&siblings).is_empty(), "{values:?}");
                assert!(plan_renumbering(&siblings).is_empty(), "{values:?}");
            }
        }
    }

    #[test]
    fn duplicates_are_errors() {
        let mut rng = rand::rng();
        let mut values = vec![1, 2, 2, 3, 4];
        values.shuffle(&mut rng);
        let issues = check_sequence(&slots(&values));

        let duplicate = issues
            .iter()
            .find(|i| matches!(i, SequenceIssue::Duplicate { .. }))
            .unwrap();
        assert_eq!(duplicate.severity(), Severity::Error);
        match duplicate {
            SequenceIssue::Duplicate {
                ordinal,
                record_ids,
            } => {
                assert_eq!(*ordinal, 2);
                assert_eq!(record_ids.len(), 2);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_value_is_a_warning_gap() {
        let issues = check_sequence(&slots(&[1, 3, 4]));
        assert_eq!(
            issues,
            vec![SequenceIssue::Gap {
                after: 1,
                before: 3
            }]
        );
        assert_eq!(issues[0].severity(), Severity::Warning);
    }

    #[test]
    fn single_sibling_off_one_is_a_gap() {
        let siblings = slots(&[4]);
        assert_eq!(
            check_sequence(&siblings),
            vec![SequenceIssue::Gap {
                after: 0,
                before: 4
            }]
        );
        assert_eq!(ordinals(&repaired(&siblings)), vec![1]);
    }

    #[test]
    fn non_positive_ordinals_are_reported() {
        let issues = check_sequence(&slots(&[0, 1, 2]));
        assert_eq!(
            issues,
            vec![SequenceIssue::NonPositive {
                ordinal: 0,
                record_id: 1
            }]
        );
        assert_eq!(ordinals(&repaired(&slots(&[0, 1, 2]))), vec![1, 2, 3]);
    }

    #[test]
    fn repair_closes_gaps_in_order() {
        let siblings = slots(&[1, 3, 5]);
        let fixed = repaired(&siblings);
        assert_eq!(ordinals(&fixed), vec![1, 2, 3]);
        assert!(check_sequence(&fixed).is_empty());
        assert_eq!(
            plan_renumbering(&siblings),
            vec![
                Renumbering {
                    record_id: 2,
                    from: 3,
                    to: 2
                },
                Renumbering {
                    record_id: 3,
                    from: 5,
                    to: 3
                },
            ]
        );
    }

    #[test]
    fn repair_breaks_ties_by_arrival_order() {
        let siblings = slots(&[1, 1, 2]);
        let fixed = repaired(&siblings);
        assert_eq!(ordinals(&fixed), vec![1, 2, 3]);
        assert!(check_sequence(&fixed).is_empty());
    }

    #[test]
    fn repair_is_idempotent_and_keeps_relative_order() {
        for _ in 0..50 {
            let len = rand::random_range(1..10);
            let values: Vec<i64> = (0..len).map(|_| rand::random_range(-2..15)).collect();
            let siblings = slots(&values);

            let once = repaired(&siblings);
            let twice = repaired(&once);
            assert_eq!(once, twice, "{values:?}");
            assert!(check_sequence(&once).is_empty(), "{values:?}");

            let pairs: Vec<(&Slot, &Slot)> = siblings.iter().zip(once.iter()).collect();
            for (a_before, a_after) in &pairs {
                for (b_before, b_after) in &pairs {
                    if a_before.ordinal < b_before.ordinal {
                        assert!(a_after.ordinal < b_after.ordinal, "{values:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn groups_by_parent_id() {
        let sets = vec![
            ExerciseSet {
                id: 1,
                exercise_instance_id: 10,
                set_number: 1,
                weight: 60.0,
                reps: 5,
                rpe: None,
                tempo: None,
                is_warmup: false,
                completed_at: None,
            },
            ExerciseSet {
                id: 2,
                exercise_instance_id: 11,
                set_number: 1,
                weight: 80.0,
                reps: 5,
                rpe: None,
                tempo: None,
                is_warmup: false,
                completed_at: None,
            },
        ];
        let groups = group_by_parent(&sets);
        assert_eq!(groups.len(), 2);
        assert!(groups.values().all(|g| check_sequence(g).is_empty()));
    }
}
