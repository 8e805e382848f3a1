//! Gatefall - a side-scrolling gate runner
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (rigid bodies, obstacle stream, tick)
//! - `session`: Run state, high score and world lifecycle
//! - `persistence`: Key/value storage ports
//! - `platform`: Host lifecycle signals
//! - `settings`: Data-driven tuning

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScoreRecord;
pub use session::{GameSession, SessionState};
pub use settings::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the host loop will feed into the accumulator
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 400.0;
    pub const VIEWPORT_HEIGHT: f32 = 800.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 41.0;

    /// Ceiling and floor thickness
    pub const BOUNDARY_THICKNESS: f32 = 50.0;
    /// Floor segments overlap by this much so the seam never opens
    pub const FLOOR_OVERLAP: f32 = 4.0;

    /// Constant downward acceleration (pixels/s²), independent of engine gravity
    pub const FALL_ACCELERATION: f32 = 600.0;
    /// Maximum downward speed (pixels/s)
    pub const TERMINAL_FALL_SPEED: f32 = 180.0;
    /// Vertical velocity set by a flap (negative = upward)
    pub const FLAP_VELOCITY: f32 = -300.0;

    /// Leftward scroll speed of gates and floor (pixels/s)
    pub const SCROLL_SPEED: f32 = 180.0;

    /// Gate defaults
    pub const GATE_WIDTH: f32 = 100.0;
    /// Clear distance between one gate's right edge and the next gate's left edge
    pub const GATE_SPACING: f32 = 220.0;
    pub const GAP_HEIGHT: f32 = 220.0;
    /// Minimum distance between the gap and the ceiling/floor
    pub const GAP_MARGIN: f32 = 40.0;
}
