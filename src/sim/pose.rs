//! Per-tick presentation properties handed to the renderer
//!
//! Nothing here affects gameplay; it only turns simulation state into the
//! handful of sprite properties the renderer needs (angle, scale, frame,
//! tile offset).

use serde::{Deserialize, Serialize};

use super::state::Phase;

/// Frames in the flapping animation
pub const FLAP_FRAMES: u32 = 4;
/// Flapping animation speed
pub const FLAP_FPS: f32 = 10.0;
/// Frame shown while diving or dead
pub const DIVE_FRAME: u32 = 3;
/// Steepest nose-up tilt (degrees, negative is up)
pub const MAX_TILT_UP: f32 = -30.0;
/// Nose straight down
pub const DIVE_ANGLE: f32 = 90.0;
pub const BASE_SCALE: f32 = 1.0;
/// Per-tick growth of the player sprite after a crash
pub const GAME_OVER_SCALE_STEP: f32 = 1.2;
pub const GAME_OVER_MAX_SCALE: f32 = 4.0;
/// Width of one fence tile, the ground offset wraps at this
pub const GROUND_TILE_WIDTH: f32 = 32.0;

/// Sprite properties for the player body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdPose {
    pub angle_deg: f32,
    pub scale: f32,
    pub frame: u32,
    /// Whether the flap animation is running
    pub flying: bool,
    anim_ms: f32,
}

impl Default for BirdPose {
    fn default() -> Self {
        Self {
            angle_deg: 0.0,
            scale: BASE_SCALE,
            frame: 0,
            flying: true,
            anim_ms: 0.0,
        }
    }
}

impl BirdPose {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(&mut self, phase: Phase, vel_y: f32, flap_velocity: f32, dt: f32) {
        match phase {
            Phase::Boot | Phase::Preloading => {}
            Phase::MainMenu => {
                self.angle_deg = 0.0;
                self.scale = BASE_SCALE;
                self.flying = true;
                self.animate(dt);
            }
            Phase::Playing => {
                let tilt = if flap_velocity > 0.0 {
                    vel_y / flap_velocity * DIVE_ANGLE
                } else {
                    0.0
                };
                self.angle_deg = tilt.clamp(MAX_TILT_UP, DIVE_ANGLE);
                if self.angle_deg >= DIVE_ANGLE {
                    self.dive();
                } else {
                    self.flying = true;
                    self.animate(dt);
                }
            }
            Phase::GameOver => {
                self.dive();
                self.scale = (self.scale * GAME_OVER_SCALE_STEP).min(GAME_OVER_MAX_SCALE);
            }
        }
    }

    fn dive(&mut self) {
        self.angle_deg = DIVE_ANGLE;
        self.flying = false;
        self.frame = DIVE_FRAME;
    }

    fn animate(&mut self, dt: f32) {
        let frame_ms = 1000.0 / FLAP_FPS;
        self.anim_ms = (self.anim_ms + dt * 1000.0) % (frame_ms * FLAP_FRAMES as f32);
        self.frame = (self.anim_ms / frame_ms) as u32 % FLAP_FRAMES;
    }
}

/// Scroll the fence tiles left by `speed * dt`, wrapping at one tile
pub fn advance_ground(offset: f32, speed: f32, dt: f32) -> f32 {
    (offset + speed * dt).rem_euclid(GROUND_TILE_WIDTH)
}
