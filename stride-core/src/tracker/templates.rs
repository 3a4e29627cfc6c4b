use anyhow::Result;
use chrono::Utc;
use log::info;

use crate::db::models::{NewExerciseSet, NewWorkout, TemplateExercise, WorkoutTemplate};
use crate::db::operations::{
    add_exercise_instance, add_sets, add_template_exercise, create_template, create_workout,
    delete_template, get_all_templates, get_template, get_template_exercises,
    refresh_workout_volume,
};
use crate::domain::WorkoutDetail;
use crate::error::TrackerError;
use crate::tracker::Tracker;

impl Tracker {
    pub async fn create_template(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<WorkoutTemplate> {
        if name.trim().is_empty() {
            return Err(TrackerError::invalid("template name", "must not be empty").into());
        }
        create_template(&self.pool, name.trim(), description).await
    }

    /// Append an exercise to a template at the next position.
    pub async fn add_template_exercise(
        &self,
        template_id: i64,
        exercise_id: i64,
        target_sets: i64,
        target_reps: i64,
        target_weight: Option<f64>,
    ) -> Result<TemplateExercise> {
        if target_sets < 1 {
            return Err(TrackerError::invalid("target sets", format!("{target_sets} is below 1")).into());
        }
        if target_reps < 0 {
            return Err(TrackerError::invalid("target reps", format!("{target_reps} is negative")).into());
        }
        let _ = get_template(&self.pool, template_id).await?;
        let _ = self.exercise(exercise_id).await?;
        add_template_exercise(
            &self.pool,
            template_id,
            exercise_id,
            target_sets,
            target_reps,
            target_weight,
        )
        .await
    }

    pub async fn templates(&self) -> Result<Vec<WorkoutTemplate>> {
        get_all_templates(&self.pool).await
    }

    pub async fn template_exercises(&self, template_id: i64) -> Result<Vec<TemplateExercise>> {
        get_template_exercises(&self.pool, template_id).await
    }

    /// Start a workout pre-filled with the template's exercises, in template
    /// order, each with its target sets already logged.
    pub async fn start_workout_from_template(&self, template_id: i64) -> Result<WorkoutDetail> {
        let template = get_template(&self.pool, template_id).await?;
        let planned = get_template_exercises(&self.pool, template_id).await?;

        let now = Utc::now();
        self.finish_in_progress(now.timestamp()).await?;
        let workout = create_workout(
            &self.pool,
            &NewWorkout {
                name: template.name.clone(),
                date: now.date_naive(),
                started_at: now.timestamp(),
                ended_at: None,
                notes: None,
                template_id: Some(template.id),
            },
        )
        .await?;

        for entry in &planned {
            let instance =
                add_exercise_instance(&self.pool, workout.id, entry.exercise_id, None).await?;
            let set = NewExerciseSet {
                weight: entry.target_weight.unwrap_or(0.0),
                reps: entry.target_reps,
                ..Default::default()
            };
            add_sets(&self.pool, instance.id, &set, entry.target_sets).await?;
        }
        refresh_workout_volume(&self.pool, workout.id).await?;

        self.set_workout_id(workout.id).await?;
        info!(
            "Started workout {} from template {} with {} exercises",
            workout.id,
            template.id,
            planned.len()
        );
        self.workout_detail(workout.id).await
    }

    pub async fn delete_template(&self, template_id: i64) -> Result<()> {
        if delete_template(&self.pool, template_id).await? == 0 {
            return Err(TrackerError::not_found("template", template_id).into());
        }
        Ok(())
    }
}
