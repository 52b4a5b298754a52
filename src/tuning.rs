//! Data-driven game balance
//!
//! Every field has a default so a tuning file only needs to name what it
//! changes. Loaded from JSON, validated once, then treated as read-only.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Visible world, in pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    /// Fence strip along the bottom; the playable area ends above it
    pub ground_height: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 640.0,
            ground_height: 32.0,
        }
    }
}

impl WorldTuning {
    /// Bottom edge of the playable area
    pub fn playable_bottom(&self) -> f32 {
        self.height - self.ground_height
    }
}

/// Player body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal spawn position as a fraction of world width
    pub start_x_fraction: f32,
    pub size: Vec2,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Upward speed applied on each flap (px/s)
    pub flap_velocity: f32,
    /// Slack past the top/bottom of the playable area before the round ends
    pub out_of_bounds_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_x_fraction: 0.25,
            size: Vec2::new(40.0, 40.0),
            gravity: 1200.0,
            flap_velocity: 420.0,
            out_of_bounds_margin: 0.0,
        }
    }
}

/// Score-driven difficulty curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Smallest gap, reached at `max_score`
    pub base_gap: f32,
    /// Extra gap granted at score 0
    pub extra_range: f32,
    /// Score at which difficulty stops increasing (0 disables scaling)
    pub max_score: u32,
    /// Leftward obstacle speed at score 0 (px/s)
    pub base_speed: f32,
    /// Added speed per point scored
    pub speed_gain_per_point: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            base_gap: 144.0,
            extra_range: 60.0,
            max_score: 50,
            base_speed: 180.0,
            speed_gain_per_point: 0.0,
        }
    }
}

/// How long to wait between obstacle pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpawnInterval {
    Fixed { ms: f32 },
    /// Uniform in `[min_ms, max_ms]`, shortened by current speed, never below `min_ms`
    Randomized { min_ms: f32, max_ms: f32 },
}

impl Default for SpawnInterval {
    fn default() -> Self {
        SpawnInterval::Fixed { ms: 1200.0 }
    }
}

/// Obstacle pair geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub interval: SpawnInterval,
    /// Vertical jitter amplitude as a fraction of world height
    pub jitter_fraction: f32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            interval: SpawnInterval::default(),
            jitter_fraction: 1.0 / 6.0,
            obstacle_width: 64.0,
            obstacle_height: 640.0,
        }
    }
}

/// Parallax cloud layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTuning {
    pub enabled: bool,
    pub min_interval_ms: f32,
    pub max_interval_ms: f32,
    /// Unscaled sprite size
    pub size: Vec2,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Number of sprite frames to pick from
    pub frames: u32,
}

impl Default for CloudTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: 5000.0,
            max_interval_ms: 10000.0,
            size: Vec2::new(128.0, 64.0),
            min_scale: 2.0,
            max_scale: 4.0,
            frames: 4,
        }
    }
}

/// Where to post scores. Both fields must be set for the board to be usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub board_id: Option<String>,
    pub endpoint: Option<String>,
    /// Rows requested when the board is shown
    pub fetch_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            board_id: None,
            endpoint: None,
            fetch_limit: 10,
        }
    }
}

impl LeaderboardConfig {
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.board_id) && set(&self.endpoint)
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub difficulty: DifficultyTuning,
    pub spawn: SpawnTuning,
    pub clouds: CloudTuning,
    /// Minimum time in GameOver before input returns to the menu
    pub game_over_cooldown_ms: f32,
    pub leaderboard: LeaderboardConfig,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world: WorldTuning::default(),
            player: PlayerTuning::default(),
            difficulty: DifficultyTuning::default(),
            spawn: SpawnTuning::default(),
            clouds: CloudTuning::default(),
            game_over_cooldown_ms: 1000.0,
            leaderboard: LeaderboardConfig::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        // NaN fails both of these
        let positive = |v: f32| v.is_finite() && v > 0.0;
        let non_negative = |v: f32| v.is_finite() && v >= 0.0;
        let positive_size = |v: Vec2| positive(v.x) && positive(v.y);

        let world = &self.world;
        if !positive(world.width) || !positive(world.height) {
            return invalid("world dimensions must be positive");
        }
        if !non_negative(world.ground_height) || world.ground_height >= world.height {
            return invalid("ground height must fit inside the world");
        }

        let player = &self.player;
        if !(0.0..=1.0).contains(&player.start_x_fraction) {
            return invalid("player start must be inside the world");
        }
        if !positive_size(player.size) {
            return invalid("player size must be positive");
        }
        if !non_negative(player.gravity) || !positive(player.flap_velocity) {
            return invalid("gravity must be >= 0 and flap velocity positive");
        }
        if !non_negative(player.out_of_bounds_margin) {
            return invalid("out of bounds margin cannot be negative");
        }

        let difficulty = &self.difficulty;
        if !positive(difficulty.base_gap) || !non_negative(difficulty.extra_range) {
            return invalid("gap sizes must be positive");
        }
        if difficulty.base_gap + difficulty.extra_range > world.playable_bottom() {
            return invalid("widest gap does not fit in the playable area");
        }
        if !positive(difficulty.base_speed) || !non_negative(difficulty.speed_gain_per_point) {
            return invalid("obstacle speed must be positive");
        }

        match self.spawn.interval {
            SpawnInterval::Fixed { ms } if !positive(ms) => {
                return invalid("spawn interval must be positive");
            }
            SpawnInterval::Randomized { min_ms, max_ms }
                if !positive(min_ms) || !max_ms.is_finite() || max_ms < min_ms =>
            {
                return invalid("randomized spawn interval needs 0 < min_ms <= max_ms");
            }
            _ => {}
        }
        if !(0.0..0.5).contains(&self.spawn.jitter_fraction) {
            return invalid("jitter fraction must be in [0, 0.5)");
        }
        if !positive(self.spawn.obstacle_width) || !positive(self.spawn.obstacle_height) {
            return invalid("obstacle size must be positive");
        }

        let clouds = &self.clouds;
        if !positive(clouds.min_interval_ms)
            || !clouds.max_interval_ms.is_finite()
            || clouds.max_interval_ms < clouds.min_interval_ms
        {
            return invalid("cloud interval needs 0 < min <= max");
        }
        if !positive(clouds.min_scale)
            || !clouds.max_scale.is_finite()
            || clouds.max_scale < clouds.min_scale
        {
            return invalid("cloud scale needs 0 < min <= max");
        }
        if !positive_size(clouds.size) || clouds.frames == 0 {
            return invalid("cloud sprite needs a positive size and at least one frame");
        }

        if !non_negative(self.game_over_cooldown_ms) {
            return invalid("game over cooldown cannot be negative");
        }
        Ok(())
    }
}
