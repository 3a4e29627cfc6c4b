//! Display-ready summaries derived from logged rows. Everything here is a
//! plain reduction over already-loaded lists; the tracker does the loading.

pub mod records;
pub mod streak;
pub mod summary;
pub mod trend;
pub mod volume;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::models::SetRecord;
use crate::domain::parse_date;

pub use records::{PersonalRecord, RecordKind, detect_new_records, personal_records};
pub use streak::{StreakSummary, calculate_streak};
pub use summary::{PeriodSummary, SummaryComparison, compare_periods, summarize_period};
pub use trend::{Trend, TrendDirection, body_weight_trend, classify_trend, percent_change};
pub use volume::{ExerciseImprovement, PeriodVolume, most_improved_exercise, weekly_volume};

/// One logged set with the date of the workout it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SetSample {
    pub set_id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: i64,
    pub is_warmup: bool,
}

impl SetSample {
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }

    /// Warmups and zero-rep sets do not count toward volume or records.
    pub fn is_working(&self) -> bool {
        !self.is_warmup && self.reps > 0
    }
}

impl TryFrom<SetRecord> for SetSample {
    type Error = anyhow::Error;

    fn try_from(r: SetRecord) -> Result<Self> {
        Ok(SetSample {
            set_id: r.set_id,
            workout_id: r.workout_id,
            exercise_id: r.exercise_id,
            date: parse_date(&r.date)?,
            weight: r.weight,
            reps: r.reps,
            is_warmup: r.is_warmup,
        })
    }
}

pub fn samples_from_records(records: Vec<SetRecord>) -> Result<Vec<SetSample>> {
    records.into_iter().map(SetSample::try_from).collect()
}

/// Samples dated within `from..=to`.
pub fn samples_between(samples: &[SetSample], from: NaiveDate, to: NaiveDate) -> Vec<SetSample> {
    samples
        .iter()
        .filter(|s| s.date >= from && s.date <= to)
        .copied()
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::SetSample;
    use chrono::NaiveDate;

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn sample(set_id: i64, exercise_id: i64, date: NaiveDate, weight: f64, reps: i64) -> SetSample {
        SetSample {
            set_id,
            workout_id: set_id,
            exercise_id,
            date,
            weight,
            reps,
            is_warmup: false,
        }
    }
}
