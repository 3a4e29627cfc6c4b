//! Exercise catalog with an invalidate-on-write cache.

use anyhow::Result;
use log::debug;

use crate::db::models::{Exercise, NewExercise};
use crate::db::operations::{
    count_exercise_references, create_exercise, delete_exercise, find_exercise_by_name,
    get_all_exercises, rename_exercise,
};
use crate::error::TrackerError;
use crate::tracker::Tracker;

impl Tracker {
    /// All exercises sorted by name. Served from the cache after the first
    /// call until an exercise is written.
    pub async fn exercises(&self) -> Result<Vec<Exercise>> {
        if let Some(cache) = self.exercise_cache.read().await.as_ref() {
            let mut exercises: Vec<Exercise> = cache.values().cloned().collect();
            exercises.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(exercises);
        }

        let exercises = get_all_exercises(&self.pool).await?;
        debug!("Caching {} exercises", exercises.len());
        *self.exercise_cache.write().await =
            Some(exercises.iter().map(|e| (e.id, e.clone())).collect());
        Ok(exercises)
    }

    pub async fn exercise(&self, exercise_id: i64) -> Result<Exercise> {
        self.exercises()
            .await?
            .into_iter()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| TrackerError::not_found("exercise", exercise_id).into())
    }

    pub async fn find_exercise(&self, name: &str) -> Result<Option<Exercise>> {
        find_exercise_by_name(&self.pool, name).await
    }

    pub async fn create_exercise(&self, new: &NewExercise) -> Result<Exercise> {
        let exercise = create_exercise(&self.pool, new).await?;
        self.invalidate_exercise_cache().await;
        Ok(exercise)
    }

    /// Case-insensitive lookup, creating a custom exercise when missing.
    pub async fn get_or_create_exercise(&self, name: &str) -> Result<Exercise> {
        if let Some(exercise) = self.find_exercise(name).await? {
            return Ok(exercise);
        }
        debug!("Creating custom exercise {}", name);
        self.create_exercise(&NewExercise {
            name: name.to_string(),
            ..Default::default()
        })
        .await
    }

    pub async fn rename_exercise(&self, exercise_id: i64, name: &str) -> Result<Exercise> {
        let exercise = rename_exercise(&self.pool, exercise_id, name).await?;
        self.invalidate_exercise_cache().await;
        Ok(exercise)
    }

    /// Deletes an exercise nothing refers to.
    pub async fn delete_exercise(&self, exercise_id: i64) -> Result<()> {
        if count_exercise_references(&self.pool, exercise_id).await? > 0 {
            return Err(TrackerError::ExerciseInUse(exercise_id).into());
        }
        if delete_exercise(&self.pool, exercise_id).await? == 0 {
            return Err(TrackerError::not_found("exercise", exercise_id).into());
        }
        self.invalidate_exercise_cache().await;
        Ok(())
    }

    pub(crate) async fn invalidate_exercise_cache(&self) {
        *self.exercise_cache.write().await = None;
    }
}
