//! Tracker module: the repository facade front ends talk to.
//!
//! `Tracker` owns the connection pool, the id of the active workout and an
//! exercise cache. Operations are grouped by concern in the submodules.

mod analytics;
mod exercises;
mod goals;
mod integrity;
mod sets;
mod templates;
mod weight;
mod workouts;

pub use sets::LoggedSet;

use anyhow::Result;
use log::info;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

use crate::config::StoreConfig;
use crate::db;
use crate::db::models::Exercise;
use crate::error::TrackerError;

pub struct Tracker {
    pool: SqlitePool,
    workout_id: Mutex<Option<i64>>,
    exercise_cache: RwLock<Option<HashMap<i64, Exercise>>>,
}

impl Tracker {
    /// Opens the store, runs migrations and resumes an in-progress workout
    /// if one exists.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let pool = db::connect(config).await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let in_progress = db::operations::get_in_progress_workout(&pool).await?;
        if let Some(workout) = &in_progress {
            info!("Resuming in-progress workout {}", workout.id);
        }

        Ok(Self {
            pool,
            workout_id: Mutex::new(in_progress.map(|w| w.id)),
            exercise_cache: RwLock::new(None),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get_workout_id(&self) -> Option<i64> {
        *self.workout_id.lock().await
    }

    pub(crate) async fn require_workout_id(&self) -> Result<i64> {
        self.get_workout_id()
            .await
            .ok_or_else(|| TrackerError::NoActiveWorkout.into())
    }

    /// Empties every table. Intended for demo resets.
    pub async fn reset(&self) -> Result<()> {
        db::clear_all_tables(&self.pool).await?;
        *self.workout_id.lock().await = None;
        self.invalidate_exercise_cache().await;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
