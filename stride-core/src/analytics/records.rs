use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::analytics::SetSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RecordKind {
    MaxWeight,
    MaxReps,
    MaxVolume,
    EstimatedOneRepMax,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::MaxWeight,
        RecordKind::MaxReps,
        RecordKind::MaxVolume,
        RecordKind::EstimatedOneRepMax,
    ];

    pub fn value_of(&self, sample: &SetSample) -> f64 {
        match self {
            RecordKind::MaxWeight => sample.weight,
            RecordKind::MaxReps => sample.reps as f64,
            RecordKind::MaxVolume => sample.volume(),
            RecordKind::EstimatedOneRepMax => estimated_one_rep_max(sample.weight, sample.reps),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::MaxWeight => write!(f, "max weight"),
            RecordKind::MaxReps => write!(f, "max reps"),
            RecordKind::MaxVolume => write!(f, "max set volume"),
            RecordKind::EstimatedOneRepMax => write!(f, "estimated 1RM"),
        }
    }
}

/// Epley estimate. A single rep is taken at face value.
pub fn estimated_one_rep_max(weight: f64, reps: i64) -> f64 {
    match reps {
        r if r <= 0 => 0.0,
        1 => weight,
        r => weight * (1.0 + r as f64 / 30.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PersonalRecord {
    pub exercise_id: i64,
    pub kind: RecordKind,
    pub value: f64,
    pub set_id: i64,
    pub achieved_on: NaiveDate,
}

/// Best working set per exercise and record kind. The earliest set to reach
/// a value holds the record; samples are ordered by date (then set id) first.
pub fn personal_records(samples: &[SetSample]) -> Vec<PersonalRecord> {
    let mut ordered: Vec<&SetSample> = samples.iter().filter(|s| s.is_working()).collect();
    ordered.sort_by_key(|s| (s.date, s.set_id));

    let mut best: BTreeMap<(i64, RecordKind), PersonalRecord> = BTreeMap::new();
    for sample in ordered {
        for kind in RecordKind::ALL {
            let value = kind.value_of(sample);
            let key = (sample.exercise_id, kind);
            if best.get(&key).is_some_and(|r| r.value >= value) {
                continue;
            }
            best.insert(
                key,
                PersonalRecord {
                    exercise_id: sample.exercise_id,
                    kind,
                    value,
                    set_id: sample.set_id,
                    achieved_on: sample.date,
                },
            );
        }
    }

    best.into_values().collect()
}

/// Record kinds `candidate` strictly beats among the working sets in
/// `earlier`, which must hold only sets logged before it. The first set ever
/// logged for an exercise sets no record.
pub fn detect_new_records(earlier: &[SetSample], candidate: &SetSample) -> Vec<RecordKind> {
    if !candidate.is_working() {
        return Vec::new();
    }

    let previous: Vec<&SetSample> = earlier
        .iter()
        .filter(|s| {
            s.exercise_id == candidate.exercise_id && s.set_id != candidate.set_id && s.is_working()
        })
        .collect();
    if previous.is_empty() {
        return Vec::new();
    }

    RecordKind::ALL
        .into_iter()
        .filter(|kind| {
            let value = kind.value_of(candidate);
            previous.iter().all(|s| kind.value_of(s) < value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{day, sample};

    #[test]
    fn epley_estimate() {
        assert_eq!(estimated_one_rep_max(100.0, 1), 100.0);
        assert_eq!(estimated_one_rep_max(100.0, 0), 0.0);
        assert!((estimated_one_rep_max(100.0, 10) - 133.333).abs() < 0.001);
    }

    #[test]
    fn earliest_set_holds_tied_record() {
        let samples = [
            sample(2, 1, day(2026, 3, 2), 100.0, 5),
            sample(1, 1, day(2026, 3, 1), 100.0, 3),
            sample(3, 1, day(2026, 3, 3), 80.0, 12),
        ];
        let records = personal_records(&samples);
        let max_weight = records
            .iter()
            .find(|r| r.kind == RecordKind::MaxWeight)
            .unwrap();
        assert_eq!(max_weight.set_id, 1);
        assert_eq!(max_weight.achieved_on, day(2026, 3, 1));

        let max_reps = records
            .iter()
            .find(|r| r.kind == RecordKind::MaxReps)
            .unwrap();
        assert_eq!(max_reps.value, 12.0);
        assert_eq!(records.len(), RecordKind::ALL.len());
    }

    #[test]
    fn detects_beaten_kinds_only() {
        let history = [
            sample(1, 1, day(2026, 3, 1), 100.0, 5),
            sample(2, 1, day(2026, 3, 2), 90.0, 4),
            sample(3, 2, day(2026, 3, 2), 300.0, 20),
        ];
        let candidate = sample(4, 1, day(2026, 3, 5), 105.0, 5);
        assert_eq!(
            detect_new_records(&history, &candidate),
            vec![
                RecordKind::MaxWeight,
                RecordKind::MaxVolume,
                RecordKind::EstimatedOneRepMax
            ]
        );
    }

    #[test]
    fn first_set_and_warmups_set_no_records() {
        let first = sample(1, 1, day(2026, 3, 1), 100.0, 5);
        assert!(detect_new_records(&[first], &first).is_empty());

        let mut warmup = sample(2, 1, day(2026, 3, 2), 200.0, 5);
        warmup.is_warmup = true;
        assert!(detect_new_records(&[first], &warmup).is_empty());
    }
}
