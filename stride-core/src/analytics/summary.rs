use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::analytics::trend::Trend;
use crate::analytics::volume::total_volume;
use crate::analytics::{SetSample, samples_between};
use crate::domain::Workout;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub workout_count: usize,
    pub set_count: usize,
    pub total_volume: f64,
    /// Over finished workouts only.
    pub average_duration_minutes: Option<f64>,
}

/// Totals for workouts and working sets dated within `start..=end`.
pub fn summarize_period(
    workouts: &[Workout],
    samples: &[SetSample],
    start: NaiveDate,
    end: NaiveDate,
) -> PeriodSummary {
    let in_period: Vec<&Workout> = workouts
        .iter()
        .filter(|w| w.date >= start && w.date <= end)
        .collect();
    let sets = samples_between(samples, start, end);

    let durations: Vec<f64> = in_period
        .iter()
        .filter_map(|w| w.duration())
        .map(|d| d.num_seconds() as f64 / 60.0)
        .collect();
    let average_duration_minutes =
        (!durations.is_empty()).then(|| durations.iter().sum::<f64>() / durations.len() as f64);

    PeriodSummary {
        start,
        end,
        workout_count: in_period.len(),
        set_count: sets.iter().filter(|s| s.is_working()).count(),
        total_volume: total_volume(&sets),
        average_duration_minutes,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryComparison {
    pub current: PeriodSummary,
    pub previous: PeriodSummary,
    pub volume_trend: Trend,
    pub frequency_trend: Trend,
}

/// The `days`-long period ending `today` against the one right before it.
pub fn compare_periods(
    workouts: &[Workout],
    samples: &[SetSample],
    today: NaiveDate,
    days: i64,
) -> SummaryComparison {
    let days = days.max(1);
    let current_start = today - Duration::days(days - 1);
    let previous_end = current_start - Duration::days(1);
    let previous_start = previous_end - Duration::days(days - 1);

    let current = summarize_period(workouts, samples, current_start, today);
    let previous = summarize_period(workouts, samples, previous_start, previous_end);

    SummaryComparison {
        volume_trend: Trend::between(current.total_volume, previous.total_volume),
        frequency_trend: Trend::between(current.workout_count as f64, previous.workout_count as f64),
        current,
        previous,
    }
}
