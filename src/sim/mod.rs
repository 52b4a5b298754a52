//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod bounds;
pub mod clouds;
pub mod difficulty;
pub mod pose;
pub mod scoring;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use bounds::Rect;
pub use difficulty::{DifficultyState, gap, speed};
pub use pose::BirdPose;
pub use session::Session;
pub use spawner::{ObstaclePair, next_interval_ms, spawn_pair, sweep_offscreen};
pub use state::{
    BodyKind, Cloud, GameEvent, Obstacle, Phase, Player, ScoreTrigger, SessionEvent, Sound,
    SpawnTimer,
};
pub use tick::{TickInput, tick};
