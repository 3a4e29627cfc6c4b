use thiserror::Error as ThisError;
use uniffi::Error;

use crate::error::TrackerError;

#[derive(Debug, ThisError, Error)]
#[non_exhaustive]
pub enum StrideError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("error: {0}")]
    Common(String),
}

impl From<anyhow::Error> for StrideError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast_ref::<TrackerError>() {
            Some(TrackerError::NotFound { .. }) | Some(TrackerError::NoActiveWorkout) => {
                StrideError::NotFound(e.to_string())
            }
            Some(TrackerError::InvalidValue { .. }) | Some(TrackerError::ExerciseInUse(_)) => {
                StrideError::Invalid(e.to_string())
            }
            _ => StrideError::Common(e.to_string()),
        }
    }
}

impl From<String> for StrideError {
    fn from(s: String) -> Self {
        StrideError::Common(s)
    }
}

impl From<&str> for StrideError {
    fn from(s: &str) -> Self {
        StrideError::Common(s.to_string())
    }
}
