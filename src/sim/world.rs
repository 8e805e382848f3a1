//! Rigid-body world
//!
//! Owns every body of a run: the ceiling, two scrolling floor segments, the
//! player and whatever obstacle posts the obstacle stream registers. Ambient
//! gravity is zero; the player falls under a separate constant acceleration
//! and rises only through flaps.

use glam::Vec2;

use super::body::{Body, BodyId, BodyKind};
use super::collision::{ContactBegin, ContactTracker};
use crate::consts::FLOOR_OVERLAP;
use crate::settings::Tuning;

/// 2D physics world with the game's static geometry
#[derive(Debug, Clone)]
pub struct RigidBodyWorld {
    /// All bodies, indexed by `BodyId`
    bodies: Vec<Body>,
    player: BodyId,
    ceiling: BodyId,
    floors: [BodyId; 2],
    /// Engine gravity (kept at zero)
    gravity: Vec2,
    fall_acceleration: f32,
    terminal_fall_speed: f32,
    flap_velocity: f32,
    viewport: Vec2,
    contacts: ContactTracker,
}

impl RigidBodyWorld {
    /// Build a world for the given viewport with default tuning
    pub fn create(viewport_width: f32, viewport_height: f32) -> Self {
        Self::new(&Tuning::with_viewport(viewport_width, viewport_height))
    }

    pub fn new(tuning: &Tuning) -> Self {
        let w = tuning.viewport_width;
        let h = tuning.viewport_height;
        let t = tuning.boundary_thickness;

        let mut world = Self {
            bodies: Vec::with_capacity(16),
            player: BodyId(0),
            ceiling: BodyId(0),
            floors: [BodyId(0); 2],
            gravity: Vec2::ZERO,
            fall_acceleration: tuning.fall_acceleration,
            terminal_fall_speed: tuning.terminal_fall_speed,
            flap_velocity: tuning.flap_velocity,
            viewport: Vec2::new(w, h),
            contacts: ContactTracker::new(),
        };

        world.player = world.insert(Body::new_dynamic(
            BodyId(0),
            BodyKind::Player,
            Vec2::new(w / 2.0, h / 2.0),
            Vec2::new(tuning.player_width, tuning.player_height),
        ));

        // Two floor tiles side by side cover 2x the viewport for wrap-scrolling
        let floor_size = Vec2::new(w + FLOOR_OVERLAP, t);
        world.floors = [
            world.add_static(BodyKind::Floor, Vec2::new(w / 2.0, h - t / 2.0), floor_size),
            world.add_static(BodyKind::Floor, Vec2::new(w + w / 2.0, h - t / 2.0), floor_size),
        ];

        world.ceiling = world.add_static(BodyKind::Ceiling, Vec2::new(w / 2.0, 0.0), Vec2::new(w, t));

        log::debug!("World created: {}x{}, {} bodies", w, h, world.bodies.len());
        world
    }

    fn insert(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        body.id = id;
        self.bodies.push(body);
        id
    }

    /// Register a static body and return its identity
    pub fn add_static(&mut self, kind: BodyKind, pos: Vec2, size: Vec2) -> BodyId {
        self.insert(Body::new_static(BodyId(0), kind, pos, size))
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize).filter(|b| b.id == id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0 as usize).filter(|b| b.id == id)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn player(&self) -> &Body {
        &self.bodies[self.player.0 as usize]
    }

    pub fn player_mut(&mut self) -> &mut Body {
        &mut self.bodies[self.player.0 as usize]
    }

    pub fn ceiling(&self) -> &Body {
        &self.bodies[self.ceiling.0 as usize]
    }

    pub fn floors(&self) -> [&Body; 2] {
        [
            &self.bodies[self.floors[0].0 as usize],
            &self.bodies[self.floors[1].0 as usize],
        ]
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Replace the player's vertical velocity with the flap velocity
    pub fn apply_flap(&mut self) {
        let flap = self.flap_velocity;
        self.player_mut().vel.y = flap;
    }

    /// Integrate dynamic bodies and return contacts that began this step
    pub fn step(&mut self, dt: f32) -> Vec<ContactBegin> {
        let gravity = self.gravity;
        let player = self.player;
        let fall = self.fall_acceleration;
        let terminal = self.terminal_fall_speed;

        for body in self.bodies.iter_mut().filter(|b| !b.is_static) {
            body.vel += gravity * dt;
            if body.id == player {
                body.vel.y = (body.vel.y + fall * dt).min(terminal);
            }
            body.pos += body.vel * dt;
        }

        let subject = self.bodies[player.0 as usize].clone();
        self.contacts.update(&subject, &self.bodies)
    }

    /// Scroll both floor tiles left, wrapping a tile that left the screen as
    /// many times as needed to bring it back
    pub fn scroll_floors(&mut self, dx: f32) {
        let wrap = self.viewport.x * 2.0;
        for id in self.floors {
            let floor = &mut self.bodies[id.0 as usize];
            floor.translate(Vec2::new(-dx, 0.0));
            if floor.right() < 0.0 && wrap > 0.0 {
                let laps = (-floor.right() / wrap).ceil();
                floor.translate(Vec2::new(wrap * laps, 0.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_layout() {
        let world = RigidBodyWorld::create(400.0, 800.0);
        assert_eq!(world.bodies().len(), 4);
        assert_eq!(world.gravity(), Vec2::ZERO);

        let players = world.bodies().iter().filter(|b| b.kind == BodyKind::Player).count();
        assert_eq!(players, 1);

        let player = world.player();
        assert_eq!(player.pos, Vec2::new(200.0, 400.0));
        assert_eq!(player.vel, Vec2::ZERO);
        assert!(!player.is_static);

        let [a, b] = world.floors();
        assert_eq!(a.pos.y, 775.0);
        assert!(a.is_static && b.is_static);
        assert!(a.left() <= 0.0);
        assert!(b.right() >= 800.0);

        let ceiling = world.ceiling();
        assert_eq!(ceiling.pos.y, 0.0);
        assert_eq!(ceiling.size.x, 400.0);
    }

    #[test]
    fn test_falls_without_input() {
        let mut world = RigidBodyWorld::create(400.0, 800.0);
        world.step(0.016);
        assert!(world.player().vel.y > 0.0);
        assert!(world.player().pos.y > 400.0);
    }

    #[test]
    fn test_fall_speed_capped() {
        let mut world = RigidBodyWorld::create(400.0, 800.0);
        for _ in 0..60 {
            world.step(0.016);
        }
        assert!(world.player().vel.y <= crate::consts::TERMINAL_FALL_SPEED);
    }

    #[test]
    fn test_flap_sets_upward_velocity() {
        let mut world = RigidBodyWorld::create(400.0, 800.0);
        for _ in 0..10 {
            world.step(0.016);
        }
        world.apply_flap();
        assert_eq!(world.player().vel.y, crate::consts::FLAP_VELOCITY);
        let y = world.player().pos.y;
        world.step(0.016);
        assert!(world.player().pos.y < y);
    }

    #[test]
    fn test_floor_contact_begins() {
        let mut world = RigidBodyWorld::create(400.0, 800.0);
        let mut contacts = Vec::new();
        for _ in 0..400 {
            contacts.extend(world.step(0.016));
            if !contacts.is_empty() {
                break;
            }
        }
        assert!(!contacts.is_empty());
        let other = world.body(contacts[0].b).unwrap();
        assert_eq!(other.kind, BodyKind::Floor);
    }

    fn assert_floor_covers(world: &RigidBodyWorld, width: f32) {
        let [a, b] = world.floors();
        let (first, second) = if a.left() <= b.left() { (a, b) } else { (b, a) };
        assert!(first.left() <= 0.0, "gap at left edge");
        assert!(second.left() <= first.right(), "gap between tiles");
        assert!(second.right() >= width, "gap at right edge");
    }

    #[test]
    fn test_floor_wrap_keeps_viewport_covered() {
        let mut world = RigidBodyWorld::create(400.0, 800.0);
        for _ in 0..1000 {
            world.scroll_floors(7.0);
            assert_floor_covers(&world, 400.0);
        }
    }

    #[test]
    fn test_floor_wrap_after_long_scroll() {
        // More than two viewport widths in one call
        for dx in [801.0, 2523.0, 10_000.0] {
            let mut world = RigidBodyWorld::create(400.0, 800.0);
            world.scroll_floors(dx);
            assert_floor_covers(&world, 400.0);
        }
    }

    #[test]
    fn test_static_bodies_not_integrated() {
        let mut world = RigidBodyWorld::create(400.0, 800.0);
        let ceiling = world.ceiling().clone();
        world.step(0.5);
        assert_eq!(world.ceiling(), &ceiling);
    }
}
