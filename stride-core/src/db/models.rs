use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// Exercise models
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub primary_muscle: Option<String>,
    pub equipment: Option<String>,
    pub is_custom: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewExercise {
    pub name: String,
    pub category: Option<String>,
    pub primary_muscle: Option<String>,
    pub equipment: Option<String>,
}

// Workout models
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
    pub total_volume: f64,
    pub template_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub name: String,
    pub date: chrono::NaiveDate,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub notes: Option<String>,
    pub template_id: Option<i64>,
}

#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseInstance {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub order_in_workout: i64,
    pub notes: Option<String>,
}

// Set models
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: i64,
    pub exercise_instance_id: i64,
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
    pub rpe: Option<f64>,
    pub tempo: Option<String>,
    pub is_warmup: bool,
    pub completed_at: Option<i64>,
}

impl ExerciseSet {
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

impl fmt::Display for ExerciseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rpe_str = self.rpe.map(|r| format!(" @{:.1}", r)).unwrap_or_default();
        let warmup = if self.is_warmup { " (warmup)" } else { "" };

        write!(
            f,
            "Set {}: {:.1}kg x {} reps{}{}",
            self.set_number, self.weight, self.reps, rpe_str, warmup
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewExerciseSet {
    pub weight: f64,
    pub reps: i64,
    pub rpe: Option<f64>,
    pub tempo: Option<String>,
    pub is_warmup: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateExerciseSet {
    pub weight: Option<f64>,
    pub reps: Option<i64>,
    pub rpe: Option<Option<f64>>,
    pub tempo: Option<Option<String>>,
    pub is_warmup: Option<bool>,
}

/// A set joined with the workout date and exercise it belongs to. Input row
/// for every analytics computation.
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct SetRecord {
    pub set_id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub date: String,
    pub weight: f64,
    pub reps: i64,
    pub is_warmup: bool,
}

// Goal models
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub goal_type: String,
    pub exercise_id: Option<i64>,
    pub title: String,
    pub start_value: f64,
    pub target_value: f64,
    pub current_value: f64,
    pub deadline: Option<String>,
    pub is_completed: bool,
    pub created_at: i64,
}

#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: i64,
    pub weight: f64,
    pub recorded_on: String,
    pub notes: Option<String>,
}

// Template models
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
}

#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub id: i64,
    pub template_id: i64,
    pub exercise_id: i64,
    pub order_in_template: i64,
    pub target_sets: i64,
    pub target_reps: i64,
    pub target_weight: Option<f64>,
}
