use thiserror::Error;

/// Input errors the caller must see, as opposed to "no data" outcomes which
/// are reported as ordinary results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    #[error("Invalid time '{0}': expected HH:MM")]
    MalformedTime(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("Mood must be a number between 1 and 10, got {0}")]
    MoodOutOfRange(u8),

    #[error("City name must not be empty")]
    EmptyCity,
}
