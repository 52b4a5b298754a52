//! Error types
//!
//! Nothing here is fatal during play: callers log and carry on.

use thiserror::Error;

/// Failure loading or validating [`crate::Tuning`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure talking to the key-value store
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored value for `{key}` is malformed: {value:?}")]
    Malformed { key: String, value: String },
}

/// Failure reported by the leaderboard collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    /// Board id or endpoint missing from tuning
    #[error("leaderboard is not configured")]
    NotConfigured,
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
    #[error("leaderboard rejected request: {0}")]
    Rejected(String),
}
