//! Workout lifecycle and lookups.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::info;
use std::collections::HashMap;

use crate::db::models::NewWorkout;
use crate::db::operations::{
    create_workout, delete_workout, finish_workout, get_all_workouts, get_instances_for_workout,
    get_in_progress_workout, get_sets_for_workout, get_workout, get_workouts_between,
    update_workout_notes,
};
use crate::domain::{ExerciseEntry, Workout, WorkoutDetail};
use crate::tracker::Tracker;

impl Tracker {
    /// Make an existing workout the active one.
    pub async fn set_workout_id(&self, workout_id: i64) -> Result<()> {
        let _ = get_workout(&self.pool, workout_id).await?;
        *self.workout_id.lock().await = Some(workout_id);
        Ok(())
    }

    /// Start a workout now, finishing any workout still in progress.
    pub async fn start_workout(&self, name: Option<&str>) -> Result<Workout> {
        let now = Utc::now();
        self.finish_in_progress(now.timestamp()).await?;

        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Workout {}", now.format("%Y-%m-%d")));
        let workout = create_workout(
            &self.pool,
            &NewWorkout {
                name,
                date: now.date_naive(),
                started_at: now.timestamp(),
                ended_at: None,
                notes: None,
                template_id: None,
            },
        )
        .await?;

        self.set_workout_id(workout.id).await?;
        info!("Started workout {}", workout.id);
        workout.try_into()
    }

    pub(crate) async fn finish_in_progress(&self, ended_at: i64) -> Result<()> {
        if let Some(existing) = get_in_progress_workout(&self.pool).await? {
            info!("Finishing in-progress workout {} first", existing.id);
            finish_workout(&self.pool, existing.id, ended_at.max(existing.started_at), None).await?;
            let mut current = self.workout_id.lock().await;
            if *current == Some(existing.id) {
                *current = None;
            }
        }
        Ok(())
    }

    /// Record a workout with explicit times, e.g. when importing history.
    pub async fn record_workout(&self, new: &NewWorkout) -> Result<Workout> {
        create_workout(&self.pool, new).await?.try_into()
    }

    /// Finish the active workout.
    pub async fn finish_workout(&self, rating: Option<i64>) -> Result<Workout> {
        let workout_id = self.require_workout_id().await?;
        let finished = finish_workout(&self.pool, workout_id, Utc::now().timestamp(), rating).await?;
        *self.workout_id.lock().await = None;
        info!("Finished workout {}", workout_id);
        finished.try_into()
    }

    pub async fn get_workout(&self, workout_id: i64) -> Result<Workout> {
        get_workout(&self.pool, workout_id).await?.try_into()
    }

    /// The active workout.
    pub async fn current_workout(&self) -> Result<Workout> {
        let workout_id = self.require_workout_id().await?;
        self.get_workout(workout_id).await
    }

    /// Newest first.
    pub async fn list_workouts(&self, completed_only: bool) -> Result<Vec<Workout>> {
        get_all_workouts(&self.pool, completed_only)
            .await?
            .into_iter()
            .map(Workout::try_from)
            .collect()
    }

    pub async fn workouts_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Workout>> {
        get_workouts_between(&self.pool, from, to)
            .await?
            .into_iter()
            .map(Workout::try_from)
            .collect()
    }

    pub async fn set_workout_notes(&self, workout_id: i64, notes: Option<&str>) -> Result<Workout> {
        update_workout_notes(&self.pool, workout_id, notes)
            .await?
            .try_into()
    }

    /// The workout with its exercises in order and each exercise's sets.
    pub async fn workout_detail(&self, workout_id: i64) -> Result<WorkoutDetail> {
        let workout: Workout = get_workout(&self.pool, workout_id).await?.try_into()?;
        let instances = get_instances_for_workout(&self.pool, workout_id).await?;
        let names: HashMap<i64, String> = self
            .exercises()
            .await?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();

        let mut sets_by_instance: HashMap<i64, Vec<_>> = HashMap::new();
        for set in get_sets_for_workout(&self.pool, workout_id).await? {
            sets_by_instance
                .entry(set.exercise_instance_id)
                .or_default()
                .push(set);
        }

        let exercises = instances
            .into_iter()
            .map(|instance| ExerciseEntry {
                instance_id: instance.id,
                exercise_id: instance.exercise_id,
                exercise_name: names
                    .get(&instance.exercise_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                order_in_workout: instance.order_in_workout,
                notes: instance.notes,
                sets: sets_by_instance.remove(&instance.id).unwrap_or_default(),
            })
            .collect();

        Ok(WorkoutDetail { workout, exercises })
    }

    /// Delete a workout with everything logged in it.
    pub async fn delete_workout(&self, workout_id: i64) -> Result<u64> {
        let deleted = delete_workout(&self.pool, workout_id).await?;
        let mut current = self.workout_id.lock().await;
        if *current == Some(workout_id) {
            *current = None;
        }
        Ok(deleted)
    }
}
