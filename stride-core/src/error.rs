use thiserror::Error;

/// Domain failures surfaced by tracker operations. Carried inside
/// `anyhow::Error` so callers can `downcast_ref` when they care.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("no active workout")]
    NoActiveWorkout,
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("exercise {0} is still referenced by logged workouts or templates")]
    ExerciseInUse(i64),
}

impl TrackerError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        TrackerError::NotFound { entity, id }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TrackerError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
