use chrono::{Local, NaiveDate};
use log::debug;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::db::models::NewExerciseSet;
use crate::domain::parse_date;
use crate::runtime::init_global_runtime_blocking;
use crate::tracker::Tracker;
use crate::uniffi_interface::errors::StrideError;
use crate::uniffi_interface::objects::{
    Exercise, IntegritySummary, LoggedSets, PersonalRecordEntry, RepairSummary, Streak,
    TrendSummary, WorkoutSession, WorkoutSet,
};

fn block_on<F, T>(future: F) -> Result<T, StrideError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let rt = init_global_runtime_blocking()?;
    Ok(rt.block_on(future)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(uniffi::Object)]
pub struct MobileTracker {
    inner: Tracker,
}

#[uniffi::export]
impl MobileTracker {
    /// Opens (creating if needed) the database file at `db_path`.
    #[uniffi::constructor]
    pub fn new(db_path: String) -> Result<Arc<Self>, StrideError> {
        debug!("Opening tracker at {}", db_path);
        let config = StoreConfig::new(format!("sqlite://{db_path}"));
        let inner = block_on(Tracker::open(&config))?;
        Ok(Arc::new(MobileTracker { inner }))
    }

    pub fn reset_database(&self) -> Result<(), StrideError> {
        block_on(self.inner.reset())
    }

    pub fn active_workout_id(&self) -> Result<Option<i64>, StrideError> {
        block_on(async { Ok::<_, anyhow::Error>(self.inner.get_workout_id().await) })
    }

    pub fn start_workout(&self, name: Option<String>) -> Result<Arc<WorkoutSession>, StrideError> {
        let workout = block_on(self.inner.start_workout(name.as_deref()))?;
        Ok(Arc::new(workout.into()))
    }

    pub fn start_workout_from_template(
        &self,
        template_id: i64,
    ) -> Result<Arc<WorkoutSession>, StrideError> {
        let detail = block_on(self.inner.start_workout_from_template(template_id))?;
        Ok(Arc::new(detail.workout.into()))
    }

    pub fn finish_workout(&self, rating: Option<i64>) -> Result<Arc<WorkoutSession>, StrideError> {
        let workout = block_on(self.inner.finish_workout(rating))?;
        Ok(Arc::new(workout.into()))
    }

    pub fn set_active_workout(&self, workout_id: i64) -> Result<(), StrideError> {
        block_on(self.inner.set_workout_id(workout_id))
    }

    pub fn workouts(&self) -> Result<Vec<Arc<WorkoutSession>>, StrideError> {
        let workouts = block_on(self.inner.list_workouts(false))?;
        Ok(workouts
            .into_iter()
            .map(|w| Arc::new(WorkoutSession::from(w)))
            .collect())
    }

    pub fn delete_workout(&self, workout_id: i64) -> Result<(), StrideError> {
        block_on(self.inner.delete_workout(workout_id))?;
        Ok(())
    }

    pub fn exercises(&self) -> Result<Vec<Arc<Exercise>>, StrideError> {
        let exercises = block_on(self.inner.exercises())?;
        Ok(exercises
            .into_iter()
            .map(|e| Arc::new(Exercise::from(e)))
            .collect())
    }

    /// Log `count` sets of an exercise (by name) in the active workout.
    pub fn log_sets(
        &self,
        exercise_name: String,
        weight: f64,
        reps: i64,
        count: i64,
        rpe: Option<f64>,
        is_warmup: bool,
    ) -> Result<LoggedSets, StrideError> {
        let set = NewExerciseSet {
            weight,
            reps,
            rpe,
            tempo: None,
            is_warmup,
        };
        let logged = block_on(self.inner.log_sets_by_name(&exercise_name, &set, count))?;
        Ok(logged.into())
    }

    pub fn sets(&self, instance_id: i64) -> Result<Vec<Arc<WorkoutSet>>, StrideError> {
        let sets = block_on(self.inner.sets(instance_id))?;
        Ok(sets
            .into_iter()
            .map(|s| Arc::new(WorkoutSet::from(s)))
            .collect())
    }

    pub fn delete_set(&self, set_id: i64) -> Result<(), StrideError> {
        block_on(self.inner.delete_set(set_id))
    }

    pub fn move_exercise(&self, instance_id: i64, position: i64) -> Result<(), StrideError> {
        block_on(self.inner.move_exercise(instance_id, position))
    }

    pub fn log_weight(&self, weight: f64, recorded_on: Option<String>) -> Result<(), StrideError> {
        let date = match recorded_on {
            Some(raw) => parse_date(&raw)?,
            None => today(),
        };
        block_on(self.inner.log_weight(weight, date, None))?;
        Ok(())
    }

    pub fn weight_trend(&self) -> Result<Option<TrendSummary>, StrideError> {
        Ok(block_on(self.inner.weight_trend(today()))?.map(Into::into))
    }

    pub fn streak(&self) -> Result<Streak, StrideError> {
        Ok(block_on(self.inner.streak(today()))?.into())
    }

    pub fn volume_trend(&self, days: i64) -> Result<TrendSummary, StrideError> {
        Ok(block_on(self.inner.compare_periods(today(), days))?
            .volume_trend
            .into())
    }

    pub fn personal_records(
        &self,
        exercise_id: Option<i64>,
    ) -> Result<Vec<PersonalRecordEntry>, StrideError> {
        let records = block_on(self.inner.personal_records(exercise_id))?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    pub fn check_integrity(&self) -> Result<IntegritySummary, StrideError> {
        Ok(block_on(self.inner.check_integrity())?.into())
    }

    pub fn repair(&self) -> Result<RepairSummary, StrideError> {
        Ok(block_on(self.inner.repair_all())?.into())
    }
}
