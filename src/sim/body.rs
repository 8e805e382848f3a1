//! Rigid bodies
//!
//! Every body is an axis-aligned rectangle described by its centre and size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable body identity, unique within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// What a body represents in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Ceiling,
    Floor,
    /// Upper or lower half of a gate
    ObstaclePost,
}

/// Axis-aligned bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Strict overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// A rigid rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    /// Centre position (y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Full width and height
    pub size: Vec2,
    /// Static bodies are never integrated by the engine
    pub is_static: bool,
}

impl Body {
    pub fn new_static(id: BodyId, kind: BodyKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size,
            is_static: true,
        }
    }

    pub fn new_dynamic(id: BodyId, kind: BodyKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            is_static: false,
            ..Self::new_static(id, kind, pos, size)
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        let half = self.size / 2.0;
        Aabb {
            min: self.pos - half,
            max: self.pos + half,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.size.x / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Move by an offset without touching velocity
    #[inline]
    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
}
