use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::SetSample;

/// Sum of weight x reps over working sets.
pub fn total_volume(samples: &[SetSample]) -> f64 {
    samples
        .iter()
        .filter(|s| s.is_working())
        .map(SetSample::volume)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodVolume {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub volume: f64,
    pub set_count: usize,
}

/// Volume per 7-day window, oldest first; the last window ends on `today`.
pub fn weekly_volume(samples: &[SetSample], weeks: u32, today: NaiveDate) -> Vec<PeriodVolume> {
    (0..weeks)
        .rev()
        .map(|weeks_back| {
            let end = today - Duration::weeks(weeks_back as i64);
            let start = end - Duration::days(6);
            let in_window: Vec<&SetSample> = samples
                .iter()
                .filter(|s| s.is_working() && s.date >= start && s.date <= end)
                .collect();
            PeriodVolume {
                start,
                end,
                volume: in_window.iter().map(|s| s.volume()).sum(),
                set_count: in_window.len(),
            }
        })
        .collect()
}

/// Heaviest working weight per exercise.
pub fn best_weights(samples: &[SetSample]) -> BTreeMap<i64, f64> {
    let mut best: BTreeMap<i64, f64> = BTreeMap::new();
    for sample in samples.iter().filter(|s| s.is_working()) {
        best.entry(sample.exercise_id)
            .and_modify(|w| *w = w.max(sample.weight))
            .or_insert(sample.weight);
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExerciseImprovement {
    pub exercise_id: i64,
    pub previous_best: f64,
    pub current_best: f64,
    pub gain: f64,
    pub percent: Option<f64>,
}

/// Exercise with the largest gain in best weight between two periods. Only
/// exercises trained in both periods qualify; ties go to the lower exercise
/// id. `None` when nothing improved.
pub fn most_improved_exercise(
    current: &[SetSample],
    previous: &[SetSample],
) -> Option<ExerciseImprovement> {
    let previous_best = best_weights(previous);
    let mut winner: Option<ExerciseImprovement> = None;

    for (exercise_id, current_best) in best_weights(current) {
        let Some(&before) = previous_best.get(&exercise_id) else {
            continue;
        };
        let gain = current_best - before;
        if gain <= 0.0 || winner.is_some_and(|w| w.gain >= gain) {
            continue;
        }
        winner = Some(ExerciseImprovement {
            exercise_id,
            previous_best: before,
            current_best,
            gain,
            percent: crate::analytics::percent_change(current_best, before),
        });
    }

    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{day, sample};

    #[test]
    fn warmups_do_not_count() {
        let mut warmup = sample(1, 1, day(2026, 3, 1), 40.0, 10);
        warmup.is_warmup = true;
        let samples = [warmup, sample(2, 1, day(2026, 3, 1), 100.0, 5)];
        assert_eq!(total_volume(&samples), 500.0);
    }

    #[test]
    fn weekly_windows_end_today() {
        let today = day(2026, 3, 14);
        let samples = [
            sample(1, 1, day(2026, 3, 1), 100.0, 5),
            sample(2, 1, day(2026, 3, 8), 100.0, 5),
            sample(3, 1, day(2026, 3, 9), 50.0, 10),
            sample(4, 1, day(2026, 3, 14), 20.0, 10),
        ];
        let weeks = weekly_volume(&samples, 2, today);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].start, day(2026, 3, 1));
        assert_eq!(weeks[0].end, day(2026, 3, 7));
        assert_eq!(weeks[0].volume, 500.0);
        assert_eq!(weeks[1].start, day(2026, 3, 8));
        assert_eq!(weeks[1].volume, 500.0 + 500.0 + 200.0);
        assert_eq!(weeks[1].set_count, 3);
    }

    #[test]
    fn most_improved_needs_both_periods() {
        let previous = [
            sample(1, 1, day(2026, 2, 1), 100.0, 5),
            sample(2, 2, day(2026, 2, 1), 60.0, 5),
        ];
        let current = [
            sample(3, 1, day(2026, 3, 1), 105.0, 5),
            sample(4, 2, day(2026, 3, 1), 70.0, 5),
            sample(5, 3, day(2026, 3, 1), 200.0, 5),
        ];
        let improvement = most_improved_exercise(&current, &previous).unwrap();
        assert_eq!(improvement.exercise_id, 2);
        assert_eq!(improvement.gain, 10.0);
        assert_eq!(improvement.previous_best, 60.0);
    }

    #[test]
    fn no_improvement_is_none() {
        let previous = [sample(1, 1, day(2026, 2, 1), 100.0, 5)];
        let current = [sample(2, 1, day(2026, 3, 1), 95.0, 5)];
        assert!(most_improved_exercise(&current, &previous).is_none());
    }
}
