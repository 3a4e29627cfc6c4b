use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, info};

use crate::db::operations::{
    best_weight_for_exercise, count_workouts_since, create_goal, delete_goal, get_all_goals,
    get_goal, get_latest_weight, total_volume_since, update_goal_progress,
};
use crate::domain::{Goal, GoalType, progress_between};
use crate::error::TrackerError;
use crate::tracker::Tracker;

impl Tracker {
    /// Create a goal whose starting point is the user's current value for
    /// the goal type.
    pub async fn create_goal(
        &self,
        goal_type: GoalType,
        exercise_id: Option<i64>,
        title: &str,
        target_value: f64,
        deadline: Option<NaiveDate>,
    ) -> Result<Goal> {
        if !target_value.is_finite() {
            return Err(TrackerError::invalid("target", "must be a finite number").into());
        }
        if goal_type == GoalType::Strength && exercise_id.is_none() {
            return Err(TrackerError::invalid("exercise", "strength goals need an exercise").into());
        }
        if let Some(id) = exercise_id {
            let _ = self.exercise(id).await?;
        }

        let start_value = match goal_type {
            GoalType::Strength => match exercise_id {
                Some(id) => best_weight_for_exercise(&self.pool, id).await?.unwrap_or(0.0),
                None => 0.0,
            },
            GoalType::BodyWeight => get_latest_weight(&self.pool)
                .await?
                .map(|entry| entry.weight)
                .ok_or_else(|| {
                    TrackerError::invalid("body weight", "log a weight before setting a goal")
                })?,
            GoalType::Frequency | GoalType::Volume => 0.0,
        };

        let goal = create_goal(
            &self.pool,
            goal_type.as_str(),
            exercise_id,
            title,
            start_value,
            target_value,
            deadline,
        )
        .await?;
        info!("Created {} goal {}", goal_type, goal.id);
        goal.try_into()
    }

    pub async fn goal(&self, goal_id: i64) -> Result<Goal> {
        get_goal(&self.pool, goal_id).await?.try_into()
    }

    pub async fn goals(&self, include_completed: bool) -> Result<Vec<Goal>> {
        get_all_goals(&self.pool, include_completed)
            .await?
            .into_iter()
            .map(Goal::try_from)
            .collect()
    }

    /// Recompute the current value of every open goal from logged data and
    /// mark goals that reached their target as completed.
    pub async fn refresh_goals(&self) -> Result<Vec<Goal>> {
        let mut refreshed = Vec::new();
        for goal in self.goals(false).await? {
            let current = match goal.goal_type {
                GoalType::Strength => match goal.exercise_id {
                    Some(id) => best_weight_for_exercise(&self.pool, id)
                        .await?
                        .unwrap_or(goal.start_value),
                    None => goal.current_value,
                },
                GoalType::BodyWeight => get_latest_weight(&self.pool)
                    .await?
                    .map(|entry| entry.weight)
                    .unwrap_or(goal.current_value),
                GoalType::Frequency => {
                    count_workouts_since(&self.pool, goal.created_at).await? as f64
                }
                GoalType::Volume => total_volume_since(&self.pool, goal.created_at).await?,
            };

            let completed = progress_between(goal.start_value, goal.target_value, current) >= 1.0;
            if current == goal.current_value && !completed {
                refreshed.push(goal);
                continue;
            }

            debug!("Goal {} moves {} -> {}", goal.id, goal.current_value, current);
            if completed {
                info!("Goal {} completed", goal.id);
            }
            let updated = update_goal_progress(&self.pool, goal.id, current, completed).await?;
            refreshed.push(updated.try_into()?);
        }
        Ok(refreshed)
    }

    pub async fn delete_goal(&self, goal_id: i64) -> Result<()> {
        if delete_goal(&self.pool, goal_id).await? == 0 {
            return Err(TrackerError::not_found("goal", goal_id).into());
        }
        Ok(())
    }
}
