use anyhow::Result;
use log::info;

use crate::db::operations::{get_instances_for_workout, get_sets_for_instance};
use crate::integrity::repair::renumber_siblings;
use crate::integrity::{self, IntegrityReport, RepairOutcome, orphans};
use crate::tracker::Tracker;

impl Tracker {
    pub async fn check_integrity(&self) -> Result<IntegrityReport> {
        integrity::check_database(&self.pool).await
    }

    pub async fn repair_sequences(&self) -> Result<RepairOutcome> {
        integrity::repair_sequences(&self.pool).await
    }

    /// Delete or detach rows whose parent is gone. Returns rows changed.
    pub async fn remove_orphans(&self) -> Result<u64> {
        orphans::remove_orphans(&self.pool).await
    }

    /// Orphans first, so renumbering only sees rows that survive.
    pub async fn repair_all(&self) -> Result<RepairOutcome> {
        let orphans_removed = self.remove_orphans().await?;
        let mut outcome = self.repair_sequences().await?;
        outcome.orphans_removed = orphans_removed;
        info!(
            "Repair removed {} orphans and renumbered {} rows",
            outcome.orphans_removed, outcome.rows_renumbered
        );
        Ok(outcome)
    }

    /// Renumber one workout's exercises. Returns whether anything changed.
    pub async fn repair_workout_order(&self, workout_id: i64) -> Result<bool> {
        let instances = get_instances_for_workout(&self.pool, workout_id).await?;
        Ok(renumber_siblings(&self.pool, &instances).await? > 0)
    }

    /// Renumber one exercise instance's sets. Returns whether anything changed.
    pub async fn repair_set_numbers(&self, instance_id: i64) -> Result<bool> {
        let sets = get_sets_for_instance(&self.pool, instance_id).await?;
        Ok(renumber_siblings(&self.pool, &sets).await? > 0)
    }
}
