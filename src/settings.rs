//! Player preferences
//!
//! Persisted separately from the high score, as JSON under the `settings` key.

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::persistence::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Sound toggle button state
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Leaderboard ===
    /// Name posted alongside scores
    pub player_name: String,

    // === HUD ===
    pub show_high_score: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            player_name: "Player".to_string(),
            show_high_score: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "settings";

    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
