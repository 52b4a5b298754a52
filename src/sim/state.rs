//! Simulation entities and the small value types shared across the director

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::Rect;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing loaded yet
    Boot,
    /// Waiting for the host to finish loading assets
    Preloading,
    /// Idle, waiting for the first input
    MainMenu,
    /// Active round
    Playing,
    /// Round ended, obstacles frozen
    GameOver,
}

/// Named sound cues the audio collaborator knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Flap,
    Score,
    Hurt,
}

impl Sound {
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Flap => "flap",
            Sound::Score => "score",
            Sound::Hurt => "hurt",
        }
    }
}

/// Body the player overlapped, as reported by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Obstacle { id: u32 },
    ScoreTrigger { id: u32 },
}

/// Inputs to the session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Host is up, start loading
    Boot,
    /// Host finished loading assets
    AssetsLoaded,
    /// Discrete activate input (tap, click, key) not claimed by a UI button
    PlayerActivated,
    OverlapDetected { with: BodyKind },
    /// Player body left the playable area
    PlayerOutOfBounds,
    /// Obstacle spawn timer reached its fire time
    TimerElapsed,
}

/// Notifications for the host (audio, HUD, loaders)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Begin loading assets, answer with `SessionEvent::AssetsLoaded`
    LoadAssets,
    PhaseChanged { from: Phase, to: Phase },
    PlaySound(Sound),
    ScoreChanged { score: u32 },
    NewHighScore { score: u32 },
    PairSpawned { pair_id: u32, gap: f32, speed: f32 },
}

/// The player-controlled body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub gravity_enabled: bool,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Self::start_pos(tuning),
            vel: Vec2::ZERO,
            size: tuning.player.size,
            gravity_enabled: false,
        }
    }

    fn start_pos(tuning: &Tuning) -> Vec2 {
        Vec2::new(
            tuning.world.width * tuning.player.start_x_fraction,
            tuning.world.height / 2.0,
        )
    }

    /// Back to the start position, at rest, gravity off
    pub fn reset(&mut self, tuning: &Tuning) {
        self.pos = Self::start_pos(tuning);
        self.vel = Vec2::ZERO;
        self.gravity_enabled = false;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.pos, self.size)
    }

    pub fn flap(&mut self, flap_velocity: f32) {
        self.vel.y = -flap_velocity;
    }

    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        if self.gravity_enabled {
            self.vel.y += gravity * dt;
        }
        self.pos += self.vel * dt;
    }
}

/// One half of an obstacle pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pair_id: u32,
    pub rect: Rect,
    pub vel: Vec2,
    /// Upper obstacle, drawn upside down
    pub flipped: bool,
}

/// Invisible scoring gate that travels with its obstacle pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTrigger {
    pub id: u32,
    pub pair_id: u32,
    pub rect: Rect,
    pub vel: Vec2,
}

/// Background cloud (parallax layer, no gameplay effect)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub scale: f32,
    pub alpha: f32,
    pub frame: u32,
}

impl Cloud {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size * self.scale)
    }
}

/// Logical recurring schedule advanced by simulated time.
///
/// `None` means stopped: nothing fires until `start` is called again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    next_fire_ms: Option<f64>,
}

impl SpawnTimer {
    pub fn start(&mut self, now_ms: f64, interval_ms: f32) {
        self.next_fire_ms = Some(now_ms + interval_ms as f64);
    }

    pub fn stop(&mut self) {
        self.next_fire_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_fire_ms.is_some()
    }

    pub fn next_fire_ms(&self) -> Option<f64> {
        self.next_fire_ms
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        self.next_fire_ms.is_some_and(|t| now_ms >= t)
    }

    /// Schedule the next fire relative to `now_ms`, only if still running
    pub fn reschedule(&mut self, now_ms: f64, interval_ms: f32) {
        if self.is_active() {
            self.start(now_ms, interval_ms);
        }
    }
}

/// Monotonic entity id source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}
