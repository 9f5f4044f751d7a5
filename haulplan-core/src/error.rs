use thiserror::Error;

/// Infrastructure-level failures.
///
/// Business-rule violations (double bookings, HOS shortfalls, ...) are never
/// reported through this type; they come back as data inside
/// [`crate::engine::ScheduleOutcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("storage operation failed: {0}")]
    Storage(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

impl SchedulingError {
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}
