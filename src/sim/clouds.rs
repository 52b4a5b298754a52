//! Parallax cloud layer
//!
//! Bigger clouds are closer: they drift slower relative to their size and
//! fade further. Purely cosmetic, runs on its own timer in every phase
//! after loading.

use glam::Vec2;
use rand::Rng;

use super::state::{Cloud, EntityIds};
use crate::tuning::Tuning;

pub fn spawn_cloud<R: Rng>(tuning: &Tuning, rng: &mut R, ids: &mut EntityIds) -> Cloud {
    let clouds = &tuning.clouds;
    let scale = if clouds.max_scale > clouds.min_scale {
        rng.random_range(clouds.min_scale..=clouds.max_scale)
    } else {
        clouds.min_scale
    };
    let y = rng.random_range(0.0..=tuning.world.height / 2.0);
    let frame = rng.random_range(0..clouds.frames.max(1));

    Cloud {
        id: ids.allocate(),
        pos: Vec2::new(tuning.world.width, y),
        vel: Vec2::new(-tuning.difficulty.base_speed / scale, 0.0),
        size: clouds.size,
        scale,
        alpha: (2.0 / scale).min(1.0),
        frame,
    }
}

pub fn next_cloud_interval_ms<R: Rng>(tuning: &Tuning, rng: &mut R) -> f32 {
    let clouds = &tuning.clouds;
    if clouds.max_interval_ms > clouds.min_interval_ms {
        rng.random_range(clouds.min_interval_ms..=clouds.max_interval_ms)
    } else {
        clouds.min_interval_ms
    }
}
