//! Fixed timestep simulation tick
//!
//! Core game loop entry point: advances physics, scrolls the floor and the
//! obstacle stream, and turns contacts and gate passes into events.

use super::state::{Entities, EventQueue, GameEvent, RunStatus};

/// Advance the entity set by one step of `dt` seconds.
///
/// This is the host loop contract: the entity set goes in and comes back out.
/// A step on a finished run changes nothing and emits nothing.
pub fn step(mut entities: Entities, dt: f32, events: &mut EventQueue) -> Entities {
    step_in_place(&mut entities, dt, events);
    entities
}

/// Same as [`step`] for callers that keep the entity set in place
pub fn step_in_place(entities: &mut Entities, dt: f32, events: &mut EventQueue) {
    if entities.status == RunStatus::Over {
        return;
    }

    entities.time_ticks += 1;

    let contacts = entities.world.step(dt);
    if !contacts.is_empty() {
        entities.status = RunStatus::Over;
        events.push(GameEvent::GameOver);
        log::info!(
            "Collision at tick {} ({} contact(s))",
            entities.time_ticks,
            contacts.len()
        );
        return;
    }

    let dx = entities.scroll_speed * dt;
    entities.world.scroll_floors(dx);
    entities.obstacles.advance(&mut entities.world, dt);

    let player_x = entities.world.player().pos.x;
    for _ in 0..entities.obstacles.check_scoring(player_x) {
        events.push(GameEvent::Score);
    }
}
