use serde::Serialize;
use std::fmt;

use crate::db::models::{ExerciseSet, TemplateExercise, WeightEntry, Workout};
use crate::domain::parse_date;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub table: &'static str,
    pub record_id: i64,
    pub field: &'static str,
    pub violation: String,
}

impl FieldViolation {
    fn new(table: &'static str, record_id: i64, field: &'static str, violation: String) -> Self {
        Self {
            table,
            record_id,
            field,
            violation,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} of record {}: {}",
            self.table, self.field, self.record_id, self.violation
        )
    }
}

pub fn check_sets(sets: &[ExerciseSet]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for set in sets {
        if !set.weight.is_finite() || set.weight < 0.0 {
            violations.push(FieldViolation::new(
                "exercise_sets",
                set.id,
                "weight",
                format!("{} is not a finite non-negative number", set.weight),
            ));
        }
        if set.reps < 0 {
            violations.push(FieldViolation::new(
                "exercise_sets",
                set.id,
                "reps",
                format!("{} is negative", set.reps),
            ));
        }
        if let Some(rpe) = set.rpe {
            if !(1.0..=10.0).contains(&rpe) {
                violations.push(FieldViolation::new(
                    "exercise_sets",
                    set.id,
                    "rpe",
                    format!("{} is outside 1..=10", rpe),
                ));
            }
        }
    }
    violations
}

pub fn check_workouts(workouts: &[Workout]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for workout in workouts {
        if let Err(e) = parse_date(&workout.date) {
            violations.push(FieldViolation::new(
                "workouts",
                workout.id,
                "date",
                e.to_string(),
            ));
        }
        if let Some(ended_at) = workout.ended_at {
            if ended_at < workout.started_at {
                violations.push(FieldViolation::new(
                    "workouts",
                    workout.id,
                    "ended_at",
                    format!("{} precedes started_at {}", ended_at, workout.started_at),
                ));
            }
        }
        if let Some(rating) = workout.rating {
            if !(1..=5).contains(&rating) {
                violations.push(FieldViolation::new(
                    "workouts",
                    workout.id,
                    "rating",
                    format!("{} is outside 1..=5", rating),
                ));
            }
        }
        if workout.total_volume < 0.0 {
            violations.push(FieldViolation::new(
                "workouts",
                workout.id,
                "total_volume",
                format!("{} is negative", workout.total_volume),
            ));
        }
    }
    violations
}

pub fn check_template_exercises(rows: &[TemplateExercise]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for row in rows {
        if row.target_sets < 0 {
            violations.push(FieldViolation::new(
                "template_exercises",
                row.id,
                "target_sets",
                format!("{} is negative", row.target_sets),
            ));
        }
        if row.target_reps < 0 {
            violations.push(FieldViolation::new(
                "template_exercises",
                row.id,
                "target_reps",
                format!("{} is negative", row.target_reps),
            ));
        }
        if row.target_weight.is_some_and(|w| w < 0.0) {
            violations.push(FieldViolation::new(
                "template_exercises",
                row.id,
                "target_weight",
                "negative target weight".to_string(),
            ));
        }
    }
    violations
}

pub fn check_weight_entries(entries: &[WeightEntry]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for entry in entries {
        if !entry.weight.is_finite() || entry.weight <= 0.0 {
            violations.push(FieldViolation::new(
                "weight_history",
                entry.id,
                "weight",
                format!("{} is not a finite positive number", entry.weight),
            ));
        }
        if let Err(e) = parse_date(&entry.recorded_on) {
            violations.push(FieldViolation::new(
                "weight_history",
                entry.id,
                "recorded_on",
                e.to_string(),
            ));
        }
    }
    violations
}
