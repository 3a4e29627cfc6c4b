use anyhow::Result;
use chrono::{Duration, NaiveDate};

use crate::analytics::{
    ExerciseImprovement, PeriodVolume, PersonalRecord, SetSample, StreakSummary,
    SummaryComparison, calculate_streak, compare_periods, most_improved_exercise,
    personal_records, samples_between, samples_from_records, weekly_volume,
};
use crate::db::operations::{get_set_records, get_set_records_for_exercise, get_workout_dates};
use crate::domain::parse_date;
use crate::tracker::Tracker;

impl Tracker {
    async fn samples(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<SetSample>> {
        samples_from_records(get_set_records(&self.pool, from, to).await?)
    }

    pub async fn streak(&self, today: NaiveDate) -> Result<StreakSummary> {
        let dates = get_workout_dates(&self.pool)
            .await?
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>>>()?;
        Ok(calculate_streak(&dates, today))
    }

    /// The `days` ending `today` against the `days` before them.
    pub async fn compare_periods(&self, today: NaiveDate, days: i64) -> Result<SummaryComparison> {
        let days = days.max(1);
        let from = today - Duration::days(days * 2 - 1);
        let workouts = self.workouts_between(from, today).await?;
        let samples = self.samples(Some(from), Some(today)).await?;
        Ok(compare_periods(&workouts, &samples, today, days))
    }

    /// Oldest week first.
    pub async fn weekly_volume(&self, weeks: u32, today: NaiveDate) -> Result<Vec<PeriodVolume>> {
        let from = today - Duration::weeks(weeks as i64);
        let samples = self.samples(Some(from), Some(today)).await?;
        Ok(weekly_volume(&samples, weeks, today))
    }

    /// Records for one exercise, or for every exercise.
    pub async fn personal_records(&self, exercise_id: Option<i64>) -> Result<Vec<PersonalRecord>> {
        let records = match exercise_id {
            Some(id) => get_set_records_for_exercise(&self.pool, id).await?,
            None => get_set_records(&self.pool, None, None).await?,
        };
        Ok(personal_records(&samples_from_records(records)?))
    }

    /// Exercise whose best working weight rose most in the `days` ending
    /// `today` compared with the `days` before.
    pub async fn most_improved(
        &self,
        today: NaiveDate,
        days: i64,
    ) -> Result<Option<ExerciseImprovement>> {
        let days = days.max(1);
        let current_start = today - Duration::days(days - 1);
        let previous_end = current_start - Duration::days(1);
        let previous_start = previous_end - Duration::days(days - 1);

        let samples = self.samples(Some(previous_start), Some(today)).await?;
        let current = samples_between(&samples, current_start, today);
        let previous = samples_between(&samples, previous_start, previous_end);
        Ok(most_improved_exercise(&current, &previous))
    }
}
