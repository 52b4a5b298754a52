//! Axis-aligned rectangles and the overlap test used for every body pair

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Rectangle from its top-left corner and size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, pos + size)
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.min += delta;
        self.max += delta;
    }

    /// Closed-interval overlap, so a zero-width rectangle can still be crossed
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
