//! Obstacle stream
//!
//! Gates are pairs of posts sharing one horizontal position and one gap. A
//! fixed number of gates is created up front; a gate that scrolls far enough
//! off the left edge is moved behind the rightmost gate with a fresh gap
//! instead of being destroyed, so the gate count never changes.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{BodyId, BodyKind};
use super::world::RigidBodyWorld;
use crate::settings::Tuning;

/// An upper and lower post with one passable gap
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub upper: BodyId,
    pub lower: BodyId,
    /// Horizontal centre
    pub x: f32,
    /// Horizontal centre before the last advance
    pub prev_x: f32,
    /// Vertical centre of the gap
    pub gap_center: f32,
    /// Set once the player passes the midpoint; cleared on recycle
    pub scored: bool,
}

/// Procedural gate generator and mover
#[derive(Debug, Clone)]
pub struct ObstacleStream {
    /// Left-to-right order
    gates: VecDeque<Gate>,
    gate_width: f32,
    /// Clear distance between neighbouring gates
    spacing: f32,
    /// Horizontal velocity (pixels/s, negative = leftward)
    velocity: f32,
    gap_height: f32,
    min_gap_center: f32,
    max_gap_center: f32,
    /// Bottom of the lower post (top of the floor)
    floor_top: f32,
    rng: Pcg32,
    /// Total recycles since creation
    recycled: u64,
    /// `(prev_x, x)` of unscored gates recycled during the last advance
    recycled_sweeps: Vec<(f32, f32)>,
}

impl ObstacleStream {
    /// Place `count` gates beyond the right edge and register their posts
    pub fn initialize(world: &mut RigidBodyWorld, tuning: &Tuning, count: usize, seed: u64) -> Self {
        let mut stream = Self {
            gates: VecDeque::with_capacity(count),
            gate_width: tuning.gate_width,
            spacing: tuning.gate_spacing,
            velocity: -tuning.scroll_speed,
            gap_height: tuning.gap_height,
            min_gap_center: tuning.min_gap_center(),
            max_gap_center: tuning.max_gap_center(),
            floor_top: tuning.viewport_height - tuning.boundary_thickness,
            rng: Pcg32::seed_from_u64(seed),
            recycled: 0,
            recycled_sweeps: Vec::new(),
        };

        let first_x = tuning.viewport_width * 2.0;
        let pitch = stream.gate_width + stream.spacing;
        for i in 0..count {
            let x = first_x + pitch * i as f32;
            let gap_center = stream.random_gap_center();
            let (upper_pos, upper_size, lower_pos, lower_size) = stream.post_geometry(x, gap_center);
            let upper = world.add_static(BodyKind::ObstaclePost, upper_pos, upper_size);
            let lower = world.add_static(BodyKind::ObstaclePost, lower_pos, lower_size);
            stream.gates.push_back(Gate {
                upper,
                lower,
                x,
                prev_x: x,
                gap_center,
                scored: false,
            });
        }

        log::debug!("Obstacle stream initialized with {} gates (seed {})", count, seed);
        stream
    }

    fn random_gap_center(&mut self) -> f32 {
        self.rng.random_range(self.min_gap_center..=self.max_gap_center)
    }

    /// Centre and size of the upper and lower posts for a gate
    fn post_geometry(&self, x: f32, gap_center: f32) -> (Vec2, Vec2, Vec2, Vec2) {
        let gap_top = gap_center - self.gap_height / 2.0;
        let gap_bottom = gap_center + self.gap_height / 2.0;
        let upper_pos = Vec2::new(x, gap_top / 2.0);
        let upper_size = Vec2::new(self.gate_width, gap_top.max(0.0));
        let lower_height = (self.floor_top - gap_bottom).max(0.0);
        let lower_pos = Vec2::new(x, gap_bottom + lower_height / 2.0);
        let lower_size = Vec2::new(self.gate_width, lower_height);
        (upper_pos, upper_size, lower_pos, lower_size)
    }

    /// Write a gate's position and gap into its post bodies
    fn sync_posts(&self, world: &mut RigidBodyWorld, gate: &Gate) {
        let (upper_pos, upper_size, lower_pos, lower_size) = self.post_geometry(gate.x, gate.gap_center);
        if let Some(upper) = world.body_mut(gate.upper) {
            upper.pos = upper_pos;
            upper.size = upper_size;
        }
        if let Some(lower) = world.body_mut(gate.lower) {
            lower.pos = lower_pos;
            lower.size = lower_size;
        }
    }

    /// Move every gate by `velocity * dt` and recycle gates that left the playfield.
    /// Returns the number of gates recycled.
    pub fn advance(&mut self, world: &mut RigidBodyWorld, dt: f32) -> usize {
        let dx = self.velocity * dt;
        self.recycled_sweeps.clear();
        for gate in self.gates.iter_mut() {
            gate.prev_x = gate.x;
            gate.x += dx;
            for id in [gate.upper, gate.lower] {
                if let Some(post) = world.body_mut(id) {
                    post.translate(Vec2::new(dx, 0.0));
                }
            }
        }

        let mut recycled = 0;
        while let Some(front) = self.gates.front() {
            let right = front.x + self.gate_width / 2.0;
            if right >= -self.gate_width {
                break;
            }
            let Some(mut gate) = self.gates.pop_front() else {
                break;
            };
            if !gate.scored {
                self.recycled_sweeps.push((gate.prev_x, gate.x));
            }
            let max_right = self
                .gates
                .iter()
                .map(|g| g.x + self.gate_width / 2.0)
                .fold(right, f32::max);
            gate.x = max_right + self.spacing + self.gate_width / 2.0;
            gate.prev_x = gate.x;
            gate.gap_center = self.random_gap_center();
            gate.scored = false;
            self.sync_posts(world, &gate);
            log::debug!("Recycled gate to x={:.1}, gap={:.1}", gate.x, gate.gap_center);
            self.gates.push_back(gate);
            recycled += 1;
        }
        self.recycled += recycled as u64;
        recycled
    }

    /// Mark gates whose midpoint `player_x` crossed during the last advance,
    /// including gates recycled in that same advance.
    /// Returns the number of newly scored gates.
    pub fn check_scoring(&mut self, player_x: f32) -> u32 {
        let crossed = |before: f32, after: f32| after <= player_x && player_x < before;
        let mut scored = 0;
        for (before, after) in self.recycled_sweeps.drain(..) {
            if crossed(before, after) {
                scored += 1;
            }
        }
        for gate in self.gates.iter_mut().filter(|g| !g.scored) {
            if crossed(gate.prev_x, gate.x) {
                gate.scored = true;
                scored += 1;
            }
        }
        scored
    }

    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter()
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn gap_height(&self) -> f32 {
        self.gap_height
    }

    pub fn recycled_total(&self) -> u64 {
        self.recycled
    }

    /// First gate whose right edge is still ahead of `x`
    pub fn next_gate_after(&self, x: f32) -> Option<&Gate> {
        self.gates
            .iter()
            .find(|g| g.x + self.gate_width / 2.0 > x)
    }
}
