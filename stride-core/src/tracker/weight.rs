use anyhow::Result;
use chrono::NaiveDate;

use crate::analytics::{Trend, body_weight_trend};
use crate::db::models::WeightEntry;
use crate::db::operations::{
    add_weight_entry, delete_weight_entry, get_latest_weight, get_weight_history,
};
use crate::domain::WeightPoint;
use crate::error::TrackerError;
use crate::tracker::Tracker;

impl Tracker {
    pub async fn log_weight(
        &self,
        weight: f64,
        recorded_on: NaiveDate,
        notes: Option<&str>,
    ) -> Result<WeightEntry> {
        add_weight_entry(&self.pool, weight, recorded_on, notes).await
    }

    /// Newest first.
    pub async fn weight_history(&self) -> Result<Vec<WeightPoint>> {
        get_weight_history(&self.pool)
            .await?
            .iter()
            .map(WeightPoint::try_from)
            .collect()
    }

    pub async fn latest_weight(&self) -> Result<Option<WeightPoint>> {
        get_latest_weight(&self.pool)
            .await?
            .as_ref()
            .map(WeightPoint::try_from)
            .transpose()
    }

    pub async fn delete_weight_entry(&self, entry_id: i64) -> Result<()> {
        if delete_weight_entry(&self.pool, entry_id).await? == 0 {
            return Err(TrackerError::not_found("weight entry", entry_id).into());
        }
        Ok(())
    }

    /// Average weight over the last 30 days against the 30 days before.
    pub async fn weight_trend(&self, today: NaiveDate) -> Result<Option<Trend>> {
        Ok(body_weight_trend(&self.weight_history().await?, today))
    }
}
