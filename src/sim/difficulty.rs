//! Score-driven difficulty
//!
//! Difficulty is never stored: it is recomputed from the score whenever an
//! obstacle pair is spawned.

use crate::tuning::DifficultyTuning;

/// Gap between the upper and lower obstacle for a given score.
///
/// Shrinks linearly from `base_gap + extra_range` at score 0 to `base_gap`
/// at `max_score`, then stays there.
pub fn gap(score: u32, params: &DifficultyTuning) -> f32 {
    if params.max_score == 0 {
        return params.base_gap;
    }
    let max = params.max_score as f32;
    let remaining = (max - score as f32).clamp(0.0, max);
    params.base_gap + params.extra_range * remaining / max
}

/// Leftward obstacle speed for a given score
pub fn speed(score: u32, params: &DifficultyTuning) -> f32 {
    params.base_speed + score as f32 * params.speed_gain_per_point
}

/// Difficulty snapshot handed to the spawner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyState {
    pub score: u32,
    pub gap: f32,
    pub speed: f32,
}

impl DifficultyState {
    pub fn for_score(score: u32, params: &DifficultyTuning) -> Self {
        Self {
            score,
            gap: gap(score, params),
            speed: speed(score, params),
        }
    }
}
