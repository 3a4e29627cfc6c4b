use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    /// Consecutive days ending at the last workout, 0 once the streak lapsed.
    pub current: u32,
    pub longest: u32,
    /// Last workout was today or yesterday.
    pub is_active: bool,
    pub last_workout: Option<NaiveDate>,
}

/// Run-lengths over the distinct workout dates up to and including `today`.
pub fn calculate_streak(dates: &[NaiveDate], today: NaiveDate) -> StreakSummary {
    let mut days: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    days.sort_unstable();
    days.dedup();

    let Some(&last) = days.last() else {
        return StreakSummary::default();
    };

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in &days {
        run = match previous {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    let is_active = last == today || Some(last) == today.pred_opt();
    StreakSummary {
        current: if is_active { run } else { 0 },
        longest,
        is_active,
        last_workout: Some(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::day;

    #[test]
    fn no_workouts_no_streak() {
        assert_eq!(
            calculate_streak(&[], day(2026, 3, 10)),
            StreakSummary::default()
        );
    }

    #[test]
    fn counts_run_ending_today() {
        let dates = [
            day(2026, 3, 8),
            day(2026, 3, 9),
            day(2026, 3, 10),
            day(2026, 3, 10),
        ];
        let streak = calculate_streak(&dates, day(2026, 3, 10));
        assert_eq!(streak.current, 3);
        assert_eq!(streak.longest, 3);
        assert!(streak.is_active);
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        let dates = [day(2026, 3, 8), day(2026, 3, 9)];
        let streak = calculate_streak(&dates, day(2026, 3, 10));
        assert!(streak.is_active);
        assert_eq!(streak.current, 2);
    }

    #[test]
    fn lapsed_streak_keeps_longest() {
        let dates = [
            day(2026, 2, 27),
            day(2026, 2, 28),
            day(2026, 3, 1),
            day(2026, 3, 2),
            day(2026, 3, 6),
        ];
        let streak = calculate_streak(&dates, day(2026, 3, 10));
        assert!(!streak.is_active);
        assert_eq!(streak.current, 0);
        assert_eq!(streak.longest, 4);
        assert_eq!(streak.last_workout, Some(day(2026, 3, 6)));
    }

    #[test]
    fn future_dates_are_ignored() {
        let dates = [day(2026, 3, 10), day(2026, 3, 11)];
        let streak = calculate_streak(&dates, day(2026, 3, 10));
        assert_eq!(streak.current, 1);
        assert_eq!(streak.last_workout, Some(day(2026, 3, 10)));
    }
}
