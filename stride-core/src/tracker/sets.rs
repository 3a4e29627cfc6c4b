//! Exercise instances and sets within a workout.

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;

use crate::analytics::{RecordKind, detect_new_records, samples_from_records};
use crate::db::models::{
    ExerciseInstance, ExerciseSet, NewExerciseSet, UpdateExerciseSet,
};
use crate::db::operations::{
    add_exercise_instance, add_set, add_sets, delete_exercise_instance, delete_set,
    get_exercise_instance, get_instances_for_workout, get_set, get_set_records_for_exercise,
    get_sets_for_instance, get_workout, refresh_workout_volume, update_set,
};
use crate::error::TrackerError;
use crate::integrity::SiblingKind;
use crate::integrity::repair::{apply_renumbering, renumber_siblings};
use crate::integrity::sequence::Renumbering;
use crate::tracker::Tracker;

/// Sets written by one logging call and the records the first of them broke.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedSet {
    pub sets: Vec<ExerciseSet>,
    pub new_records: Vec<RecordKind>,
}

impl Tracker {
    /// Append an exercise to a workout at the next position.
    pub async fn add_exercise(
        &self,
        workout_id: i64,
        exercise_id: i64,
    ) -> Result<ExerciseInstance> {
        let _ = get_workout(&self.pool, workout_id).await?;
        let _ = self.exercise(exercise_id).await?;
        add_exercise_instance(&self.pool, workout_id, exercise_id, None).await
    }

    pub async fn instances(&self, workout_id: i64) -> Result<Vec<ExerciseInstance>> {
        get_instances_for_workout(&self.pool, workout_id).await
    }

    pub async fn sets(&self, instance_id: i64) -> Result<Vec<ExerciseSet>> {
        get_sets_for_instance(&self.pool, instance_id).await
    }

    /// Log `count` identical sets at the end of an exercise instance.
    pub async fn log_sets(
        &self,
        instance_id: i64,
        set: &NewExerciseSet,
        count: i64,
    ) -> Result<LoggedSet> {
        let instance = get_exercise_instance(&self.pool, instance_id).await?;
        let sets = if count == 1 {
            vec![add_set(&self.pool, instance_id, set).await?]
        } else {
            add_sets(&self.pool, instance_id, set, count).await?
        };
        refresh_workout_volume(&self.pool, instance.workout_id).await?;

        let new_records = match sets.first() {
            Some(first) => self.records_broken_by(instance.exercise_id, first.id).await?,
            None => Vec::new(),
        };
        if !new_records.is_empty() {
            info!(
                "Set {} broke {} personal records for exercise {}",
                sets[0].id,
                new_records.len(),
                instance.exercise_id
            );
        }

        Ok(LoggedSet { sets, new_records })
    }

    pub async fn log_set(&self, instance_id: i64, set: &NewExerciseSet) -> Result<LoggedSet> {
        self.log_sets(instance_id, set, 1).await
    }

    /// Log sets by exercise name in the active workout. Sets go to the last
    /// instance of that exercise in the workout, or a new one.
    pub async fn log_sets_by_name(
        &self,
        exercise_name: &str,
        set: &NewExerciseSet,
        count: i64,
    ) -> Result<LoggedSet> {
        let workout_id = self.require_workout_id().await?;
        let exercise = self.get_or_create_exercise(exercise_name).await?;

        let existing = get_instances_for_workout(&self.pool, workout_id)
            .await?
            .into_iter()
            .filter(|i| i.exercise_id == exercise.id)
            .last();
        let instance = match existing {
            Some(instance) => instance,
            None => add_exercise_instance(&self.pool, workout_id, exercise.id, None).await?,
        };

        self.log_sets(instance.id, set, count).await
    }

    /// History comes back in logging order, so everything ahead of the set is
    /// earlier. Sets logged after it, including the rest of its batch, are not.
    async fn records_broken_by(&self, exercise_id: i64, set_id: i64) -> Result<Vec<RecordKind>> {
        let history = samples_from_records(
            get_set_records_for_exercise(&self.pool, exercise_id).await?,
        )?;
        Ok(match history.iter().position(|s| s.set_id == set_id) {
            Some(pos) => detect_new_records(&history[..pos], &history[pos]),
            None => Vec::new(),
        })
    }

    pub async fn update_set(&self, set_id: i64, update: &UpdateExerciseSet) -> Result<ExerciseSet> {
        let updated = update_set(&self.pool, set_id, update).await?;
        let instance = get_exercise_instance(&self.pool, updated.exercise_instance_id).await?;
        refresh_workout_volume(&self.pool, instance.workout_id).await?;
        Ok(updated)
    }

    /// Delete a set and close the gap it leaves in the set numbers.
    pub async fn delete_set(&self, set_id: i64) -> Result<()> {
        let set = get_set(&self.pool, set_id).await?;
        delete_set(&self.pool, set_id).await?;

        let remaining = get_sets_for_instance(&self.pool, set.exercise_instance_id).await?;
        renumber_siblings(&self.pool, &remaining).await?;

        let instance = get_exercise_instance(&self.pool, set.exercise_instance_id).await?;
        refresh_workout_volume(&self.pool, instance.workout_id).await?;
        Ok(())
    }

    /// Remove an exercise (and its sets) from its workout, closing the gap in
    /// the workout order.
    pub async fn remove_exercise(&self, instance_id: i64) -> Result<()> {
        let instance = get_exercise_instance(&self.pool, instance_id).await?;
        delete_exercise_instance(&self.pool, instance_id).await?;

        let remaining = get_instances_for_workout(&self.pool, instance.workout_id).await?;
        renumber_siblings(&self.pool, &remaining).await?;
        refresh_workout_volume(&self.pool, instance.workout_id).await?;
        Ok(())
    }

    /// Move an exercise to `position` (1-based, clamped) within its workout.
    /// The whole workout is renumbered `1..=N` in the resulting order.
    pub async fn move_exercise(&self, instance_id: i64, position: i64) -> Result<()> {
        if position < 1 {
            return Err(TrackerError::invalid("position", format!("{position} is below 1")).into());
        }

        let instance = get_exercise_instance(&self.pool, instance_id).await?;
        let mut siblings = get_instances_for_workout(&self.pool, instance.workout_id).await?;
        siblings.retain(|s| s.id != instance_id);
        let index = (position as usize - 1).min(siblings.len());
        siblings.insert(index, instance);

        let changes: Vec<Renumbering> = siblings
            .iter()
            .zip(1..)
            .filter(|(s, to)| s.order_in_workout != *to)
            .map(|(s, to)| Renumbering {
                record_id: s.id,
                from: s.order_in_workout,
                to,
            })
            .collect();
        debug!(
            "Moving instance {} to position {} rewrites {} rows",
            instance_id,
            index + 1,
            changes.len()
        );
        apply_renumbering(&self.pool, SiblingKind::WorkoutExercises, &changes).await?;
        Ok(())
    }
}
