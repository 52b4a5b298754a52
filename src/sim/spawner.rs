//! Obstacle pair spawning and off-screen cleanup

use glam::Vec2;
use rand::Rng;

use super::bounds::Rect;
use super::difficulty::DifficultyState;
use super::state::{Cloud, EntityIds, Obstacle, ScoreTrigger};
use crate::tuning::{SpawnInterval, Tuning};

/// Milliseconds of interval removed per px/s of obstacle speed (randomized mode)
pub const SPEED_INTERVAL_FACTOR: f32 = 2.0;

/// A freshly spawned pair plus its scoring gate
#[derive(Debug, Clone)]
pub struct ObstaclePair {
    pub top: Obstacle,
    pub bottom: Obstacle,
    pub trigger: ScoreTrigger,
}

/// Build the next obstacle pair just past the right edge of the world.
///
/// The gap is centered on the playable midpoint plus a bounded random
/// jitter, then clamped so the whole gap stays in the playable area.
pub fn spawn_pair<R: Rng>(
    difficulty: &DifficultyState,
    tuning: &Tuning,
    rng: &mut R,
    ids: &mut EntityIds,
) -> ObstaclePair {
    let world = &tuning.world;
    let spawn = &tuning.spawn;
    let gap = difficulty.gap;
    let half_gap = gap / 2.0;

    let midpoint = world.playable_bottom() / 2.0;
    let jitter = rng.random_range(-1.0f32..=1.0) * spawn.jitter_fraction * world.height;
    let center = (midpoint + jitter)
        .min(world.playable_bottom() - half_gap)
        .max(half_gap);

    let left = world.width;
    let right = left + spawn.obstacle_width;
    let vel = Vec2::new(-difficulty.speed, 0.0);
    let pair_id = ids.allocate();

    let bottom_top = center + half_gap;
    let bottom = Obstacle {
        id: ids.allocate(),
        pair_id,
        rect: Rect::new(
            Vec2::new(left, bottom_top),
            Vec2::new(right, bottom_top + spawn.obstacle_height),
        ),
        vel,
        flipped: false,
    };

    let top_bottom = center - half_gap;
    let top = Obstacle {
        id: ids.allocate(),
        pair_id,
        rect: Rect::new(
            Vec2::new(left, top_bottom - spawn.obstacle_height),
            Vec2::new(right, top_bottom),
        ),
        vel,
        flipped: true,
    };

    // Zero-width line at the trailing edge of the upper obstacle
    let trigger = ScoreTrigger {
        id: ids.allocate(),
        pair_id,
        rect: Rect::new(Vec2::new(top.rect.max.x, 0.0), Vec2::new(top.rect.max.x, world.height)),
        vel,
    };

    ObstaclePair {
        top,
        bottom,
        trigger,
    }
}

/// Delay before the next pair, in milliseconds
pub fn next_interval_ms<R: Rng>(interval: &SpawnInterval, speed: f32, rng: &mut R) -> f32 {
    match *interval {
        SpawnInterval::Fixed { ms } => ms,
        SpawnInterval::Randomized { min_ms, max_ms } => {
            let roll = if max_ms > min_ms {
                rng.random_range(min_ms..=max_ms)
            } else {
                min_ms
            };
            (roll - SPEED_INTERVAL_FACTOR * speed).max(min_ms)
        }
    }
}

/// Drop everything whose right edge has passed `left_bound`.
///
/// Returns how many bodies were removed.
pub fn sweep_offscreen(
    obstacles: &mut Vec<Obstacle>,
    triggers: &mut Vec<ScoreTrigger>,
    clouds: &mut Vec<Cloud>,
    left_bound: f32,
) -> usize {
    let before = obstacles.len() + triggers.len() + clouds.len();
    obstacles.retain(|o| o.rect.max.x >= left_bound);
    triggers.retain(|t| t.rect.max.x >= left_bound);
    clouds.retain(|c| c.rect().max.x >= left_bound);
    before - (obstacles.len() + triggers.len() + clouds.len())
}
