//! Audio collaborator
//!
//! The simulation only ever says "play sound X". This module applies the
//! sound toggle and volumes, then hands the cue to a backend. Fire-and-forget:
//! nothing a backend does is reported back.

use crate::settings::Settings;
use crate::sim::Sound;

/// Something that can actually make noise
pub trait AudioBackend {
    fn play(&mut self, name: &str, volume: f32);
}

/// Backend that only logs cues (headless runs)
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, name: &str, volume: f32) {
        log::debug!("sfx {} @ {:.2}", name, volume);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(LogBackend))
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Pick up volume and mute state from settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.muted = !settings.sound_enabled;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn play(&mut self, sound: Sound) {
        if self.muted {
            return;
        }
        let volume = self.master_volume * self.sfx_volume;
        if volume <= 0.0 {
            return;
        }
        self.backend.play(sound.name(), volume);
    }
}
