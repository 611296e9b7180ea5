//! Error types shared across the crate

use thiserror::Error;

/// Key-value storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Score backend failures
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The backend could not be reached or refused the request
    #[error("score backend unavailable: {0}")]
    Transport(String),

    /// The backend answered with something that is not a leaderboard
    #[error("malformed leaderboard payload: {0}")]
    Malformed(String),

    #[error("score storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Rejected player names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("please enter a nickname")]
    Empty,

    #[error("nickname is longer than {max} characters")]
    TooLong { max: usize },
}

/// Invalid balance configuration
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
