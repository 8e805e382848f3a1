//! Game tuning
//!
//! Every physics and obstacle constant the simulation reads, loaded from a
//! JSON file when one is provided.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Thickness of the ceiling and floor bodies
    pub boundary_thickness: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Constant downward acceleration applied every tick (pixels/s²)
    pub fall_acceleration: f32,
    /// Cap on downward speed (pixels/s)
    pub terminal_fall_speed: f32,
    /// Vertical velocity a flap sets (negative = upward)
    pub flap_velocity: f32,

    // === Obstacles ===
    /// Leftward scroll speed for gates and floor (pixels/s)
    pub scroll_speed: f32,
    pub gate_width: f32,
    pub gate_spacing: f32,
    pub gap_height: f32,
    pub gap_margin: f32,
    /// Number of gates to keep alive (None = derived from viewport width)
    pub gate_count: Option<usize>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            boundary_thickness: BOUNDARY_THICKNESS,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            fall_acceleration: FALL_ACCELERATION,
            terminal_fall_speed: TERMINAL_FALL_SPEED,
            flap_velocity: FLAP_VELOCITY,

            scroll_speed: SCROLL_SPEED,
            gate_width: GATE_WIDTH,
            gate_spacing: GATE_SPACING,
            gap_height: GAP_HEIGHT,
            gap_margin: GAP_MARGIN,
            gate_count: None,
        }
    }
}

impl Tuning {
    /// Default tuning for a specific viewport
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            ..Self::default()
        }
    }

    /// Gates needed so at least one is on screen and one is queued off to the right
    pub fn effective_gate_count(&self) -> usize {
        self.gate_count.unwrap_or_else(|| {
            let pitch = (self.gate_width + self.gate_spacing).max(1.0);
            (self.viewport_width / pitch).ceil() as usize + 2
        })
    }

    /// Lowest allowed gap centre (smallest y)
    pub fn min_gap_center(&self) -> f32 {
        self.boundary_thickness / 2.0 + self.gap_margin + self.gap_height / 2.0
    }

    /// Highest allowed gap centre (largest y)
    pub fn max_gap_center(&self) -> f32 {
        let floor_top = self.viewport_height - self.boundary_thickness;
        (floor_top - self.gap_margin - self.gap_height / 2.0).max(self.min_gap_center())
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }

    /// Save tuning as pretty JSON (best-effort)
    pub fn save(&self, path: &Path) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            match std::fs::write(path, json) {
                Ok(()) => log::info!("Tuning saved to {}", path.display()),
                Err(e) => log::warn!("Failed to save tuning: {}", e),
            }
        }
    }
}
