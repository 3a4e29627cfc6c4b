use std::sync::Arc;

use crate::analytics::{PersonalRecord, StreakSummary, Trend};
use crate::db;
use crate::db::operations::DATE_FORMAT;
use crate::domain;
use crate::integrity::{IntegrityReport, RepairOutcome};
use crate::tracker::LoggedSet;

#[derive(uniffi::Object)]
pub struct Exercise {
    id: i64,
    name: String,
    category: String,
    is_custom: bool,
}

#[uniffi::export]
impl Exercise {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn category(&self) -> String {
        self.category.clone()
    }

    fn is_custom(&self) -> bool {
        self.is_custom
    }
}

impl From<db::models::Exercise> for Exercise {
    fn from(e: db::models::Exercise) -> Self {
        Exercise {
            id: e.id,
            name: e.name,
            category: e.category,
            is_custom: e.is_custom,
        }
    }
}

#[derive(uniffi::Object)]
pub struct WorkoutSession {
    pub id: i64,
    pub name: String,
    pub date: chrono::NaiveDate,
    pub in_progress: bool,
    pub duration_seconds: Option<i64>,
    pub total_volume: f64,
    pub rating: Option<i64>,
}

#[uniffi::export]
impl WorkoutSession {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    fn in_progress(&self) -> bool {
        self.in_progress
    }

    fn duration_seconds(&self) -> Option<i64> {
        self.duration_seconds
    }

    fn total_volume(&self) -> f64 {
        self.total_volume
    }

    fn rating(&self) -> Option<i64> {
        self.rating
    }
}

impl From<domain::Workout> for WorkoutSession {
    fn from(w: domain::Workout) -> Self {
        WorkoutSession {
            id: w.id,
            in_progress: w.is_in_progress(),
            duration_seconds: w.duration().map(|d| d.num_seconds()),
            name: w.name,
            date: w.date,
            total_volume: w.total_volume,
            rating: w.rating,
        }
    }
}

#[derive(uniffi::Object)]
pub struct WorkoutSet {
    pub id: i64,
    pub exercise_instance_id: i64,
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
    pub rpe: Option<f64>,
    pub is_warmup: bool,
}

#[uniffi::export]
impl WorkoutSet {
    fn id(&self) -> i64 {
        self.id
    }

    fn exercise_instance_id(&self) -> i64 {
        self.exercise_instance_id
    }

    fn set_number(&self) -> i64 {
        self.set_number
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn reps(&self) -> i64 {
        self.reps
    }

    fn rpe(&self) -> Option<f64> {
        self.rpe
    }

    fn is_warmup(&self) -> bool {
        self.is_warmup
    }
}

impl From<db::models::ExerciseSet> for WorkoutSet {
    fn from(s: db::models::ExerciseSet) -> Self {
        WorkoutSet {
            id: s.id,
            exercise_instance_id: s.exercise_instance_id,
            set_number: s.set_number,
            weight: s.weight,
            reps: s.reps,
            rpe: s.rpe,
            is_warmup: s.is_warmup,
        }
    }
}

#[derive(Clone, uniffi::Record)]
pub struct LoggedSets {
    pub sets: Vec<Arc<WorkoutSet>>,
    /// Display names of the records the first set broke.
    pub new_records: Vec<String>,
}

impl From<LoggedSet> for LoggedSets {
    fn from(logged: LoggedSet) -> Self {
        LoggedSets {
            sets: logged
                .sets
                .into_iter()
                .map(|s| Arc::new(WorkoutSet::from(s)))
                .collect(),
            new_records: logged.new_records.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct IntegritySummary {
    pub is_clean: bool,
    pub error_count: u64,
    pub warning_count: u64,
    pub messages: Vec<String>,
}

impl From<IntegrityReport> for IntegritySummary {
    fn from(report: IntegrityReport) -> Self {
        IntegritySummary {
            is_clean: report.is_clean(),
            error_count: report.error_count() as u64,
            warning_count: report.warning_count() as u64,
            messages: report.messages(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct RepairSummary {
    pub groups_repaired: u64,
    pub rows_renumbered: u64,
    pub orphans_removed: u64,
}

impl From<RepairOutcome> for RepairSummary {
    fn from(outcome: RepairOutcome) -> Self {
        RepairSummary {
            groups_repaired: outcome.groups_repaired as u64,
            rows_renumbered: outcome.rows_renumbered as u64,
            orphans_removed: outcome.orphans_removed,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub is_active: bool,
    pub last_workout: Option<String>,
}

impl From<StreakSummary> for Streak {
    fn from(s: StreakSummary) -> Self {
        Streak {
            current: s.current,
            longest: s.longest,
            is_active: s.is_active,
            last_workout: s.last_workout.map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct TrendSummary {
    pub current: f64,
    pub previous: f64,
    pub percent_change: Option<f64>,
    /// "up", "down" or "stable".
    pub direction: String,
}

impl From<Trend> for TrendSummary {
    fn from(t: Trend) -> Self {
        TrendSummary {
            current: t.current,
            previous: t.previous,
            percent_change: t.percent_change,
            direction: t.direction.to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct PersonalRecordEntry {
    pub exercise_id: i64,
    pub kind: String,
    pub value: f64,
    pub set_id: i64,
    pub achieved_on: String,
}

impl From<PersonalRecord> for PersonalRecordEntry {
    fn from(r: PersonalRecord) -> Self {
        PersonalRecordEntry {
            exercise_id: r.exercise_id,
            kind: r.kind.to_string(),
            value: r.value,
            set_id: r.set_id,
            achieved_on: r.achieved_on.format(DATE_FORMAT).to_string(),
        }
    }
}
