use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::domain::WeightPoint;

/// Changes within ±2% count as stable.
pub const TREND_THRESHOLD_PERCENT: f64 = 2.0;

/// Window length for the body-weight trend.
pub const BODY_WEIGHT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Percentage change from `previous` to `current`; undefined when
/// `previous` is zero.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

pub fn classify_trend(current: f64, previous: f64) -> TrendDirection {
    match percent_change(current, previous) {
        Some(pct) if pct > TREND_THRESHOLD_PERCENT => TrendDirection::Up,
        Some(pct) if pct < -TREND_THRESHOLD_PERCENT => TrendDirection::Down,
        Some(_) => TrendDirection::Stable,
        None if current > 0.0 => TrendDirection::Up,
        None => TrendDirection::Stable,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub current: f64,
    pub previous: f64,
    pub percent_change: Option<f64>,
    pub direction: TrendDirection,
}

impl Trend {
    pub fn between(current: f64, previous: f64) -> Self {
        Trend {
            current,
            previous,
            percent_change: percent_change(current, previous),
            direction: classify_trend(current, previous),
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Average of the last 30 days (ending `today`) against the 30 before.
/// `None` unless both windows have entries.
pub fn body_weight_trend(points: &[WeightPoint], today: NaiveDate) -> Option<Trend> {
    let window = Duration::days(BODY_WEIGHT_WINDOW_DAYS);
    let current_start = today - window + Duration::days(1);
    let previous_start = current_start - window;

    let current = average(
        points
            .iter()
            .filter(|p| p.date >= current_start && p.date <= today)
            .map(|p| p.weight),
    )?;
    let previous = average(
        points
            .iter()
            .filter(|p| p.date >= previous_start && p.date < current_start)
            .map(|p| p.weight),
    )?;
    Some(Trend::between(current, previous))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::day;

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(classify_trend(103.0, 100.0), TrendDirection::Up);
        assert_eq!(classify_trend(102.0, 100.0), TrendDirection::Stable);
        assert_eq!(classify_trend(98.0, 100.0), TrendDirection::Stable);
        assert_eq!(classify_trend(97.9, 100.0), TrendDirection::Down);
    }

    #[test]
    fn zero_previous_period() {
        assert_eq!(percent_change(50.0, 0.0), None);
        assert_eq!(classify_trend(50.0, 0.0), TrendDirection::Up);
        assert_eq!(classify_trend(0.0, 0.0), TrendDirection::Stable);
    }

    #[test]
    fn trend_carries_percentage() {
        let trend = Trend::between(1100.0, 1000.0);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!((trend.percent_change.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn body_weight_compares_windows() {
        let today = day(2026, 3, 31);
        let points = [
            WeightPoint {
                date: day(2026, 2, 10),
                weight: 90.0,
            },
            WeightPoint {
                date: day(2026, 2, 20),
                weight: 89.0,
            },
            WeightPoint {
                date: day(2026, 3, 20),
                weight: 86.0,
            },
            WeightPoint {
                date: day(2026, 3, 30),
                weight: 85.0,
            },
        ];
        let trend = body_weight_trend(&points, today).unwrap();
        assert_eq!(trend.previous, 89.5);
        assert_eq!(trend.current, 85.5);
        assert_eq!(trend.direction, TrendDirection::Down);

        assert!(body_weight_trend(&points[2..], today).is_none());
    }
}
