//! Tower Flap - obstacle, scoring and session director for a tower-dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (difficulty, spawning, scoring, session phases)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key-value storage for high score and settings
//! - `leaderboard`: Online leaderboard contract and panel state
//! - `audio`, `ui`: Thin collaborator adapters driven by simulation events
//! - `app`: Fixed-timestep driver tying everything together

pub mod app;
pub mod audio;
pub mod error;
pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use app::Game;
pub use error::{ConfigError, LeaderboardError, PersistError};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the driver will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
