use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::db::models::{
    Exercise, ExerciseInstance, ExerciseSet, Goal, NewExercise, NewExerciseSet, NewWorkout,
    SetRecord, TemplateExercise, UpdateExerciseSet, WeightEntry, Workout, WorkoutTemplate,
};
use crate::error::TrackerError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn now() -> i64 {
    Utc::now().timestamp()
}

fn date_str(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// Exercises
pub async fn find_exercise_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Exercise>> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE name = ?1 COLLATE NOCASE")
        .bind(name.trim())
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub async fn get_all_exercises(pool: &SqlitePool) -> Result<Vec<Exercise>> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn create_exercise(pool: &SqlitePool, new: &NewExercise) -> Result<Exercise> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(TrackerError::invalid("exercise name", "must not be empty").into());
    }

    sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (name, category, primary_muscle, equipment, is_custom)
         VALUES (?1, ?2, ?3, ?4, 1)
         RETURNING *",
    )
    .bind(name)
    .bind(new.category.as_deref().unwrap_or("strength"))
    .bind(new.primary_muscle.as_deref())
    .bind(new.equipment.as_deref())
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn rename_exercise(pool: &SqlitePool, exercise_id: i64, name: &str) -> Result<Exercise> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::invalid("exercise name", "must not be empty").into());
    }

    sqlx::query_as::<_, Exercise>("UPDATE exercises SET name = ?1 WHERE id = ?2 RETURNING *")
        .bind(name)
        .bind(exercise_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TrackerError::not_found("exercise", exercise_id).into())
}

/// Number of instances, template rows and goals pointing at the exercise.
pub async fn count_exercise_references(pool: &SqlitePool, exercise_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT (SELECT COUNT(*) FROM exercise_instances WHERE exercise_id = ?1)
              + (SELECT COUNT(*) FROM template_exercises WHERE exercise_id = ?1)
              + (SELECT COUNT(*) FROM goals WHERE exercise_id = ?1)",
    )
    .bind(exercise_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn delete_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercises WHERE id = ?1")
        .bind(exercise_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Workouts
pub async fn create_workout(pool: &SqlitePool, new: &NewWorkout) -> Result<Workout> {
    if let Some(ended_at) = new.ended_at {
        if ended_at < new.started_at {
            return Err(TrackerError::invalid("ended_at", "must not precede started_at").into());
        }
    }

    sqlx::query_as::<_, Workout>(
        "INSERT INTO workouts (name, date, started_at, ended_at, notes, template_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING *",
    )
    .bind(&new.name)
    .bind(date_str(new.date))
    .bind(new.started_at)
    .bind(new.ended_at)
    .bind(new.notes.as_deref())
    .bind(new.template_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_workout(pool: &SqlitePool, workout_id: i64) -> Result<Workout> {
    sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = ?1")
        .bind(workout_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TrackerError::not_found("workout", workout_id).into())
}

/// Workouts newest first. `completed_only` skips workouts without an end time.
pub async fn get_all_workouts(pool: &SqlitePool, completed_only: bool) -> Result<Vec<Workout>> {
    let sql = if completed_only {
        "SELECT * FROM workouts WHERE ended_at IS NOT NULL ORDER BY started_at DESC, id DESC"
    } else {
        "SELECT * FROM workouts ORDER BY started_at DESC, id DESC"
    };
    sqlx::query_as::<_, Workout>(sql)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

/// Workouts whose date falls in `from..=to`.
pub async fn get_workouts_between(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Workout>> {
    sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE date >= ?1 AND date <= ?2 ORDER BY started_at, id",
    )
    .bind(date_str(from))
    .bind(date_str(to))
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_in_progress_workout(pool: &SqlitePool) -> Result<Option<Workout>> {
    sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE ended_at IS NULL ORDER BY started_at DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

pub async fn finish_workout(
    pool: &SqlitePool,
    workout_id: i64,
    ended_at: i64,
    rating: Option<i64>,
) -> Result<Workout> {
    if let Some(rating) = rating {
        if !(1..=5).contains(&rating) {
            return Err(TrackerError::invalid("rating", format!("{rating} is outside 1..=5")).into());
        }
    }

    let workout = get_workout(pool, workout_id).await?;
    if ended_at < workout.started_at {
        return Err(TrackerError::invalid("ended_at", "must not precede started_at").into());
    }

    sqlx::query_as::<_, Workout>(
        "UPDATE workouts SET ended_at = ?1, rating = COALESCE(?2, rating), updated_at = ?3
         WHERE id = ?4
         RETURNING *",
    )
    .bind(ended_at)
    .bind(rating)
    .bind(now())
    .bind(workout_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn update_workout_notes(
    pool: &SqlitePool,
    workout_id: i64,
    notes: Option<&str>,
) -> Result<Workout> {
    sqlx::query_as::<_, Workout>(
        "UPDATE workouts SET notes = ?1, updated_at = ?2 WHERE id = ?3 RETURNING *",
    )
    .bind(notes)
    .bind(now())
    .bind(workout_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| TrackerError::not_found("workout", workout_id).into())
}

/// Recomputes the stored aggregate volume (non-warmup weight x reps).
pub async fn refresh_workout_volume(pool: &SqlitePool, workout_id: i64) -> Result<f64> {
    let volume = sqlx::query_scalar::<_, f64>(
        "UPDATE workouts SET total_volume = (
             SELECT COALESCE(SUM(s.weight * s.reps), 0.0)
             FROM exercise_sets s
             JOIN exercise_instances i ON i.id = s.exercise_instance_id
             WHERE i.workout_id = ?1 AND s.is_warmup = 0
         ), updated_at = ?2
         WHERE id = ?1
         RETURNING total_volume",
    )
    .bind(workout_id)
    .bind(now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| anyhow::Error::from(TrackerError::not_found("workout", workout_id)))?;
    Ok(volume)
}

/// Deletes the workout with its instances and sets in one transaction.
pub async fn delete_workout(pool: &SqlitePool, workout_id: i64) -> Result<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "DELETE FROM exercise_sets WHERE exercise_instance_id IN
             (SELECT id FROM exercise_instances WHERE workout_id = ?1)",
    )
    .bind(workout_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM exercise_instances WHERE workout_id = ?1")
        .bind(workout_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM workouts WHERE id = ?1")
        .bind(workout_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected())
}

pub async fn get_workout_dates(pool: &SqlitePool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>("SELECT DISTINCT date FROM workouts ORDER BY date")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

/// Workouts started at or after `since`.
pub async fn count_workouts_since(pool: &SqlitePool, since: DateTime<Utc>) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workouts WHERE started_at >= ?1")
            .bind(since.timestamp())
            .fetch_one(pool)
            .await?;
    Ok(count)
}

// Exercise instances
pub async fn add_exercise_instance(
    pool: &SqlitePool,
    workout_id: i64,
    exercise_id: i64,
    notes: Option<&str>,
) -> Result<ExerciseInstance> {
    let max_order: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(order_in_workout) FROM exercise_instances WHERE workout_id = ?1",
    )
    .bind(workout_id)
    .fetch_one(pool)
    .await?;
    let next_order = max_order.map(|n| n + 1).unwrap_or(1);

    sqlx::query_as::<_, ExerciseInstance>(
        "INSERT INTO exercise_instances (workout_id, exercise_id, order_in_workout, notes)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING *",
    )
    .bind(workout_id)
    .bind(exercise_id)
    .bind(next_order)
    .bind(notes)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_exercise_instance(pool: &SqlitePool, instance_id: i64) -> Result<ExerciseInstance> {
    sqlx::query_as::<_, ExerciseInstance>("SELECT * FROM exercise_instances WHERE id = ?1")
        .bind(instance_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TrackerError::not_found("exercise instance", instance_id).into())
}

pub async fn get_instances_for_workout(
    pool: &SqlitePool,
    workout_id: i64,
) -> Result<Vec<ExerciseInstance>> {
    sqlx::query_as::<_, ExerciseInstance>(
        "SELECT * FROM exercise_instances WHERE workout_id = ?1 ORDER BY order_in_workout, id",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_all_instances(pool: &SqlitePool) -> Result<Vec<ExerciseInstance>> {
    sqlx::query_as::<_, ExerciseInstance>(
        "SELECT * FROM exercise_instances ORDER BY workout_id, order_in_workout, id",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Deletes the instance and its sets. Sibling order is left untouched.
pub async fn delete_exercise_instance(pool: &SqlitePool, instance_id: i64) -> Result<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM exercise_sets WHERE exercise_instance_id = ?1")
        .bind(instance_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM exercise_instances WHERE id = ?1")
        .bind(instance_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected())
}

// Sets
fn validate_set(set: &NewExerciseSet) -> Result<()> {
    if !set.weight.is_finite() || set.weight < 0.0 {
        return Err(TrackerError::invalid(
            "weight",
            format!("{} is not a finite non-negative number", set.weight),
        )
        .into());
    }
    if set.reps < 0 {
        return Err(TrackerError::invalid("reps", format!("{} is negative", set.reps)).into());
    }
    if let Some(rpe) = set.rpe {
        if !(1.0..=10.0).contains(&rpe) {
            return Err(TrackerError::invalid("rpe", format!("{rpe} is outside 1..=10")).into());
        }
    }
    Ok(())
}

async fn next_set_number(pool: &SqlitePool, instance_id: i64) -> Result<i64> {
    let max_set_number: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(set_number) FROM exercise_sets WHERE exercise_instance_id = ?1",
    )
    .bind(instance_id)
    .fetch_one(pool)
    .await?;
    Ok(max_set_number.map(|n| n + 1).unwrap_or(1))
}

pub async fn add_set(
    pool: &SqlitePool,
    instance_id: i64,
    set: &NewExerciseSet,
) -> Result<ExerciseSet> {
    validate_set(set)?;
    let set_number = next_set_number(pool, instance_id).await?;

    sqlx::query_as::<_, ExerciseSet>(
        "INSERT INTO exercise_sets
             (exercise_instance_id, set_number, weight, reps, rpe, tempo, is_warmup, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         RETURNING *",
    )
    .bind(instance_id)
    .bind(set_number)
    .bind(set.weight)
    .bind(set.reps)
    .bind(set.rpe)
    .bind(set.tempo.as_deref())
    .bind(set.is_warmup)
    .bind(now())
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Add `count` identical sets, e.g. "5 sets of 5 reps at 100kg".
pub async fn add_sets(
    pool: &SqlitePool,
    instance_id: i64,
    set: &NewExerciseSet,
    count: i64,
) -> Result<Vec<ExerciseSet>> {
    validate_set(set)?;
    if count < 1 {
        return Err(TrackerError::invalid("set count", format!("{count} is below 1")).into());
    }

    let starting_set_number = next_set_number(pool, instance_id).await?;
    let completed_at = now();
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(count as usize);

    for i in 0..count {
        let row = sqlx::query_as::<_, ExerciseSet>(
            "INSERT INTO exercise_sets
                 (exercise_instance_id, set_number, weight, reps, rpe, tempo, is_warmup, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING *",
        )
        .bind(instance_id)
        .bind(starting_set_number + i)
        .bind(set.weight)
        .bind(set.reps)
        .bind(set.rpe)
        .bind(set.tempo.as_deref())
        .bind(set.is_warmup)
        .bind(completed_at)
        .fetch_one(&mut *tx)
        .await?;
        created.push(row);
    }

    tx.commit().await?;
    Ok(created)
}

pub async fn get_set(pool: &SqlitePool, set_id: i64) -> Result<ExerciseSet> {
    sqlx::query_as::<_, ExerciseSet>("SELECT * FROM exercise_sets WHERE id = ?1")
        .bind(set_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TrackerError::not_found("set", set_id).into())
}

pub async fn get_sets_for_instance(pool: &SqlitePool, instance_id: i64) -> Result<Vec<ExerciseSet>> {
    sqlx::query_as::<_, ExerciseSet>(
        "SELECT * FROM exercise_sets WHERE exercise_instance_id = ?1 ORDER BY set_number, id",
    )
    .bind(instance_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_sets_for_workout(pool: &SqlitePool, workout_id: i64) -> Result<Vec<ExerciseSet>> {
    sqlx::query_as::<_, ExerciseSet>(
        "SELECT s.* FROM exercise_sets s
         JOIN exercise_instances i ON i.id = s.exercise_instance_id
         WHERE i.workout_id = ?1
         ORDER BY i.order_in_workout, i.id, s.set_number, s.id",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_all_sets(pool: &SqlitePool) -> Result<Vec<ExerciseSet>> {
    sqlx::query_as::<_, ExerciseSet>(
        "SELECT * FROM exercise_sets ORDER BY exercise_instance_id, set_number, id",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Merges `update` into the stored set. Fields left as `None` keep their
/// original values.
pub async fn update_set(
    pool: &SqlitePool,
    set_id: i64,
    update: &UpdateExerciseSet,
) -> Result<ExerciseSet> {
    let original = get_set(pool, set_id).await?;

    let merged = NewExerciseSet {
        weight: update.weight.unwrap_or(original.weight),
        reps: update.reps.unwrap_or(original.reps),
        rpe: update.rpe.unwrap_or(original.rpe),
        tempo: update.tempo.clone().unwrap_or(original.tempo),
        is_warmup: update.is_warmup.unwrap_or(original.is_warmup),
    };
    validate_set(&merged)?;

    sqlx::query_as::<_, ExerciseSet>(
        "UPDATE exercise_sets SET weight = ?1, reps = ?2, rpe = ?3, tempo = ?4, is_warmup = ?5
         WHERE id = ?6
         RETURNING *",
    )
    .bind(merged.weight)
    .bind(merged.reps)
    .bind(merged.rpe)
    .bind(merged.tempo.as_deref())
    .bind(merged.is_warmup)
    .bind(set_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn delete_set(pool: &SqlitePool, set_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercise_sets WHERE id = ?1")
        .bind(set_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

const SET_RECORD_SELECT: &str = "SELECT s.id AS set_id, i.workout_id, i.exercise_id, w.date,
            s.weight, s.reps, s.is_warmup
     FROM exercise_sets s
     JOIN exercise_instances i ON i.id = s.exercise_instance_id
     JOIN workouts w ON w.id = i.workout_id";

/// Sets joined with their workout date, optionally limited to `from..=to`.
pub async fn get_set_records(
    pool: &SqlitePool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<SetRecord>> {
    let sql = format!(
        "{SET_RECORD_SELECT}
         WHERE (?1 IS NULL OR w.date >= ?1) AND (?2 IS NULL OR w.date <= ?2)
         ORDER BY w.date, w.started_at, i.order_in_workout, s.set_number, s.id"
    );
    sqlx::query_as::<_, SetRecord>(&sql)
        .bind(from.map(date_str))
        .bind(to.map(date_str))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn get_set_records_for_exercise(
    pool: &SqlitePool,
    exercise_id: i64,
) -> Result<Vec<SetRecord>> {
    let sql = format!(
        "{SET_RECORD_SELECT}
         WHERE i.exercise_id = ?1
         ORDER BY w.date, w.started_at, s.set_number, s.id"
    );
    sqlx::query_as::<_, SetRecord>(&sql)
        .bind(exercise_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

// Templates
pub async fn create_template(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> Result<WorkoutTemplate> {
    sqlx::query_as::<_, WorkoutTemplate>(
        "INSERT INTO workout_templates (name, description) VALUES (?1, ?2) RETURNING *",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_template(pool: &SqlitePool, template_id: i64) -> Result<WorkoutTemplate> {
    sqlx::query_as::<_, WorkoutTemplate>("SELECT * FROM workout_templates WHERE id = ?1")
        .bind(template_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TrackerError::not_found("template", template_id).into())
}

pub async fn get_all_templates(pool: &SqlitePool) -> Result<Vec<WorkoutTemplate>> {
    sqlx::query_as::<_, WorkoutTemplate>("SELECT * FROM workout_templates ORDER BY name, id")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn add_template_exercise(
    pool: &SqlitePool,
    template_id: i64,
    exercise_id: i64,
    target_sets: i64,
    target_reps: i64,
    target_weight: Option<f64>,
) -> Result<TemplateExercise> {
    let max_order: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(order_in_template) FROM template_exercises WHERE template_id = ?1",
    )
    .bind(template_id)
    .fetch_one(pool)
    .await?;
    let next_order = max_order.map(|n| n + 1).unwrap_or(1);

    sqlx::query_as::<_, TemplateExercise>(
        "INSERT INTO template_exercises
             (template_id, exercise_id, order_in_template, target_sets, target_reps, target_weight)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING *",
    )
    .bind(template_id)
    .bind(exercise_id)
    .bind(next_order)
    .bind(target_sets)
    .bind(target_reps)
    .bind(target_weight)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_template_exercises(
    pool: &SqlitePool,
    template_id: i64,
) -> Result<Vec<TemplateExercise>> {
    sqlx::query_as::<_, TemplateExercise>(
        "SELECT * FROM template_exercises WHERE template_id = ?1 ORDER BY order_in_template, id",
    )
    .bind(template_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_all_template_exercises(pool: &SqlitePool) -> Result<Vec<TemplateExercise>> {
    sqlx::query_as::<_, TemplateExercise>(
        "SELECT * FROM template_exercises ORDER BY template_id, order_in_template, id",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Deletes the template and its exercises; workouts created from it keep
/// their data and lose the back-reference.
pub async fn delete_template(pool: &SqlitePool, template_id: i64) -> Result<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE workouts SET template_id = NULL WHERE template_id = ?1")
        .bind(template_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM template_exercises WHERE template_id = ?1")
        .bind(template_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM workout_templates WHERE id = ?1")
        .bind(template_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected())
}

// Goals
pub async fn create_goal(
    pool: &SqlitePool,
    goal_type: &str,
    exercise_id: Option<i64>,
    title: &str,
    start_value: f64,
    target_value: f64,
    deadline: Option<NaiveDate>,
) -> Result<Goal> {
    sqlx::query_as::<_, Goal>(
        "INSERT INTO goals
             (goal_type, exercise_id, title, start_value, target_value, current_value, deadline)
         VALUES (?1, ?2, ?3, ?4, ?5, ?4, ?6)
         RETURNING *",
    )
    .bind(goal_type)
    .bind(exercise_id)
    .bind(title)
    .bind(start_value)
    .bind(target_value)
    .bind(deadline.map(date_str))
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_goal(pool: &SqlitePool, goal_id: i64) -> Result<Goal> {
    sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = ?1")
        .bind(goal_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TrackerError::not_found("goal", goal_id).into())
}

pub async fn get_all_goals(pool: &SqlitePool, include_completed: bool) -> Result<Vec<Goal>> {
    let sql = if include_completed {
        "SELECT * FROM goals ORDER BY is_completed, created_at, id"
    } else {
        "SELECT * FROM goals WHERE is_completed = 0 ORDER BY created_at, id"
    };
    sqlx::query_as::<_, Goal>(sql)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn update_goal_progress(
    pool: &SqlitePool,
    goal_id: i64,
    current_value: f64,
    is_completed: bool,
) -> Result<Goal> {
    sqlx::query_as::<_, Goal>(
        "UPDATE goals SET current_value = ?1, is_completed = ?2 WHERE id = ?3 RETURNING *",
    )
    .bind(current_value)
    .bind(is_completed)
    .bind(goal_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| TrackerError::not_found("goal", goal_id).into())
}

pub async fn delete_goal(pool: &SqlitePool, goal_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM goals WHERE id = ?1")
        .bind(goal_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn best_weight_for_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<Option<f64>> {
    sqlx::query_scalar::<_, Option<f64>>(
        "SELECT MAX(s.weight) FROM exercise_sets s
         JOIN exercise_instances i ON i.id = s.exercise_instance_id
         WHERE i.exercise_id = ?1 AND s.is_warmup = 0 AND s.reps > 0",
    )
    .bind(exercise_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn total_volume_since(pool: &SqlitePool, since: DateTime<Utc>) -> Result<f64> {
    sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(total_volume), 0.0) FROM workouts WHERE started_at >= ?1",
    )
    .bind(since.timestamp())
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

// Body weight
pub async fn add_weight_entry(
    pool: &SqlitePool,
    weight: f64,
    recorded_on: NaiveDate,
    notes: Option<&str>,
) -> Result<WeightEntry> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(TrackerError::invalid(
            "body weight",
            format!("{weight} is not a finite positive number"),
        )
        .into());
    }

    sqlx::query_as::<_, WeightEntry>(
        "INSERT INTO weight_history (weight, recorded_on, notes) VALUES (?1, ?2, ?3) RETURNING *",
    )
    .bind(weight)
    .bind(date_str(recorded_on))
    .bind(notes)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Weight entries newest first.
pub async fn get_weight_history(pool: &SqlitePool) -> Result<Vec<WeightEntry>> {
    sqlx::query_as::<_, WeightEntry>(
        "SELECT * FROM weight_history ORDER BY recorded_on DESC, id DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_latest_weight(pool: &SqlitePool) -> Result<Option<WeightEntry>> {
    sqlx::query_as::<_, WeightEntry>(
        "SELECT * FROM weight_history ORDER BY recorded_on DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

pub async fn delete_weight_entry(pool: &SqlitePool, entry_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM weight_history WHERE id = ?1")
        .bind(entry_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
