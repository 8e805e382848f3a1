//! Run state and the entity set handed to the host loop
//!
//! `Entities` is everything one run owns. It is moved into `step` and moved
//! back out, and is dropped whole on reset.

use serde::{Deserialize, Serialize};

use super::body::Body;
use super::obstacles::ObstacleStream;
use super::world::RigidBodyWorld;
use crate::settings::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Physics and obstacles advance every step
    Running,
    /// Collision happened; only a reset leaves this state
    Over,
}

/// Outbound discrete events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    /// Player passed a gate midpoint
    Score,
    /// Player touched any other body
    GameOver,
}

/// Append-only event list drained by the session once per tick
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Take every queued event in emission order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Every body and gate of one run
#[derive(Debug, Clone)]
pub struct Entities {
    pub world: RigidBodyWorld,
    pub obstacles: ObstacleStream,
    pub status: RunStatus,
    /// Leftward scroll speed shared by the floor and gates (pixels/s)
    pub scroll_speed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seed the obstacle stream was built from
    pub seed: u64,
}

impl Entities {
    /// Build a fresh world and obstacle stream
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        let mut world = RigidBodyWorld::new(tuning);
        let obstacles =
            ObstacleStream::initialize(&mut world, tuning, tuning.effective_gate_count(), seed);
        Self {
            world,
            obstacles,
            status: RunStatus::Running,
            scroll_speed: tuning.scroll_speed,
            time_ticks: 0,
            seed,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Flap the player; ignored once the run is over
    pub fn apply_flap(&mut self) {
        if self.is_running() {
            self.world.apply_flap();
        }
    }

    pub fn player(&self) -> &Body {
        self.world.player()
    }
}
