//! Persisted best score
//!
//! Stored under a single `highscore` key as a decimal integer. The value is
//! read once when a round ends and written only when beaten.

use crate::error::PersistError;
use crate::persistence::KeyValueStore;

/// Storage key
pub const HIGHSCORE_KEY: &str = "highscore";

/// Read the stored best score (0 when nothing stored yet)
pub fn load_high_score(store: &dyn KeyValueStore) -> Result<u32, PersistError> {
    match store.get(HIGHSCORE_KEY)? {
        None => Ok(0),
        Some(raw) => raw.trim().parse().map_err(|_| PersistError::Malformed {
            key: HIGHSCORE_KEY.to_string(),
            value: raw,
        }),
    }
}

/// Outcome of offering a finished round's score to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScoreRecord {
    /// Value found in the store before this round
    pub stored: u32,
    /// Whether `score` beat it and was written
    pub saved: bool,
}

impl HighScoreRecord {
    /// Best score known after the write
    pub fn best(&self, score: u32) -> u32 {
        self.stored.max(score)
    }
}

/// Persist `score` if it beats the stored value.
///
/// A malformed stored value counts as 0 and gets overwritten.
pub fn record_high_score(
    store: &mut dyn KeyValueStore,
    score: u32,
) -> Result<HighScoreRecord, PersistError> {
    let stored = match load_high_score(store) {
        Ok(stored) => stored,
        Err(PersistError::Malformed { value, .. }) => {
            log::warn!("Discarding malformed stored high score {:?}", value);
            0
        }
        Err(e) => return Err(e),
    };
    if score <= stored {
        return Ok(HighScoreRecord { stored, saved: false });
    }
    store.set(HIGHSCORE_KEY, &score.to_string())?;
    log::info!("New high score saved: {} (was {})", score, stored);
    Ok(HighScoreRecord { stored, saved: true })
}
