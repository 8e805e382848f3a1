//! Fixed-step simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable body identities (by `BodyId`)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod obstacles;
pub mod state;
pub mod tick;
pub mod world;

pub use body::{Aabb, Body, BodyId, BodyKind};
pub use collision::{ContactBegin, ContactTracker};
pub use obstacles::{Gate, ObstacleStream};
pub use state::{Entities, EventQueue, GameEvent, RunStatus};
pub use tick::{step, step_in_place};
pub use world::RigidBodyWorld;
