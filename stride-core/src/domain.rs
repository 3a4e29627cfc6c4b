//! Domain models built from persistence rows.
//!
//! Rows keep dates as `YYYY-MM-DD` text and instants as unix seconds; the
//! types here carry parsed `chrono` values and the derived fields the front
//! ends display.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::db::models;
use crate::db::operations::DATE_FORMAT;
use crate::error::TrackerError;

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| anyhow!("invalid date {:?}: {}", raw, e))
}

fn instant(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| anyhow!("timestamp {} out of range", secs))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
    pub total_volume: f64,
    pub template_id: Option<i64>,
}

impl Workout {
    pub fn is_in_progress(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Elapsed time of a finished workout.
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

impl TryFrom<models::Workout> for Workout {
    type Error = anyhow::Error;

    fn try_from(w: models::Workout) -> Result<Self> {
        debug!("Mapping workout {} dated {}", w.id, w.date);
        Ok(Workout {
            id: w.id,
            name: w.name,
            date: parse_date(&w.date)?,
            started_at: instant(w.started_at)?,
            ended_at: w.ended_at.map(instant).transpose()?,
            notes: w.notes,
            rating: w.rating,
            total_volume: w.total_volume,
            template_id: w.template_id,
        })
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.date)?;
        match self.duration() {
            Some(d) => write!(f, " {} min", d.num_minutes())?,
            None => write!(f, " in progress")?,
        }
        write!(f, ", {:.1}kg volume", self.total_volume)
    }
}

/// One exercise within a workout, with its sets in set-number order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseEntry {
    pub instance_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub order_in_workout: i64,
    pub notes: Option<String>,
    pub sets: Vec<models::ExerciseSet>,
}

impl ExerciseEntry {
    pub fn volume(&self) -> f64 {
        self.sets
            .iter()
            .filter(|s| !s.is_warmup)
            .map(models::ExerciseSet::volume)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub exercises: Vec<ExerciseEntry>,
}

impl WorkoutDetail {
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GoalType {
    /// Best working weight on one exercise.
    Strength,
    /// Latest body-weight entry.
    BodyWeight,
    /// Workouts logged since the goal was created.
    Frequency,
    /// Total volume lifted since the goal was created.
    Volume,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Strength => "strength",
            GoalType::BodyWeight => "body_weight",
            GoalType::Frequency => "frequency",
            GoalType::Volume => "volume",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(GoalType::Strength),
            "body_weight" | "bodyweight" | "weight" => Ok(GoalType::BodyWeight),
            "frequency" => Ok(GoalType::Frequency),
            "volume" => Ok(GoalType::Volume),
            other => Err(TrackerError::invalid("goal type", format!("unknown type {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub id: i64,
    pub goal_type: GoalType,
    pub exercise_id: Option<i64>,
    pub title: String,
    pub start_value: f64,
    pub target_value: f64,
    pub current_value: f64,
    pub deadline: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Fraction of the way from start to target, clamped to `0.0..=1.0`.
    /// Works for goals that decrease (e.g. cutting body weight) too.
    pub fn progress(&self) -> f64 {
        progress_between(self.start_value, self.target_value, self.current_value)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.deadline.is_some_and(|d| d < today)
    }
}

pub fn progress_between(start: f64, target: f64, current: f64) -> f64 {
    let span = target - start;
    if span == 0.0 {
        return if current == target { 1.0 } else { 0.0 };
    }
    ((current - start) / span).clamp(0.0, 1.0)
}

impl TryFrom<models::Goal> for Goal {
    type Error = anyhow::Error;

    fn try_from(g: models::Goal) -> Result<Self> {
        Ok(Goal {
            id: g.id,
            goal_type: g.goal_type.parse()?,
            exercise_id: g.exercise_id,
            title: g.title,
            start_value: g.start_value,
            target_value: g.target_value,
            current_value: g.current_value,
            deadline: g.deadline.as_deref().map(parse_date).transpose()?,
            is_completed: g.is_completed,
            created_at: instant(g.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

impl TryFrom<&models::WeightEntry> for WeightPoint {
    type Error = anyhow::Error;

    fn try_from(e: &models::WeightEntry) -> Result<Self> {
        Ok(WeightPoint {
            date: parse_date(&e.recorded_on)?,
            weight: e.weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ended_at: Option<i64>) -> models::Workout {
        models::Workout {
            id: 7,
            name: "Push".into(),
            date: "2026-03-10".into(),
            started_at: 1_773_136_800,
            ended_at,
            notes: None,
            rating: Some(4),
            total_volume: 1250.0,
            template_id: None,
            created_at: 1_773_136_800,
            updated_at: 1_773_136_800,
        }
    }

    #[test]
    fn maps_workout_row() {
        let workout = Workout::try_from(row(Some(1_773_136_800 + 3600))).unwrap();
        assert_eq!(workout.date, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(workout.duration(), Some(Duration::minutes(60)));
        assert!(!workout.is_in_progress());
    }

    #[test]
    fn rejects_malformed_date() {
        let mut bad = row(None);
        bad.date = "10/03/2026".into();
        assert!(Workout::try_from(bad).is_err());
    }

    #[test]
    fn goal_type_round_trips_through_text() {
        for ty in [
            GoalType::Strength,
            GoalType::BodyWeight,
            GoalType::Frequency,
            GoalType::Volume,
        ] {
            assert_eq!(ty.as_str().parse::<GoalType>().unwrap(), ty);
        }
        assert!("cardio".parse::<GoalType>().is_err());
    }

    #[test]
    fn progress_handles_decreasing_goals() {
        assert_eq!(progress_between(90.0, 80.0, 85.0), 0.5);
        assert_eq!(progress_between(90.0, 80.0, 95.0), 0.0);
        assert_eq!(progress_between(100.0, 140.0, 150.0), 1.0);
        assert_eq!(progress_between(5.0, 5.0, 5.0), 1.0);
    }
}
