//! Game session
//!
//! Owns the current run (entity set), the score and the high score, and
//! bridges to storage and host lifecycle signals. A reset drops the old
//! entity set entirely and builds a new one.

use std::sync::MutexGuard;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::highscores::{HighScoreRecord, HighScoreWriter};
use crate::persistence::KeyValueStorage;
use crate::platform::{AppState, LifecyclePort, LifecycleTracker};
use crate::settings::Tuning;
use crate::sim::{Entities, EventQueue, GameEvent, step_in_place};

/// Run state visible to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub running: bool,
    pub score: u64,
    /// Best score across runs; never decreases
    pub high_score: u64,
}

/// Orchestrates world lifecycle against run state
pub struct GameSession<S: KeyValueStorage> {
    tuning: Tuning,
    entities: Entities,
    state: SessionState,
    events: EventQueue,
    writer: HighScoreWriter<S>,
    /// Draws one seed per world build
    seeder: Pcg32,
    lifecycle: Option<Box<dyn LifecyclePort>>,
    tracker: LifecycleTracker,
    /// Worlds built so far (including the first)
    runs: u64,
}

impl<S: KeyValueStorage> GameSession<S> {
    /// Create a session with a reproducible seed and start the first run
    pub fn new(tuning: Tuning, storage: S, seed: u64) -> Self {
        let high_score = HighScoreRecord::load(&storage).map(|r| r.score).unwrap_or(0);
        let mut seeder = Pcg32::seed_from_u64(seed);
        let entities = Entities::new(&tuning, seeder.random());

        log::info!("Session started (seed {}, high score {})", seed, high_score);
        Self {
            tuning,
            entities,
            state: SessionState {
                running: true,
                score: 0,
                high_score,
            },
            events: EventQueue::new(),
            writer: HighScoreWriter::spawn(storage),
            seeder,
            lifecycle: None,
            tracker: LifecycleTracker::default(),
            runs: 1,
        }
    }

    /// Create a session seeded from OS entropy
    pub fn with_entropy(tuning: Tuning, storage: S) -> Self {
        Self::new(tuning, storage, rand::random())
    }

    /// Build a new world and obstacle stream and start running
    pub fn start(&mut self) {
        self.entities = Entities::new(&self.tuning, self.seeder.random());
        self.events = EventQueue::new();
        self.state.running = true;
        self.state.score = 0;
        self.runs += 1;
        log::info!("Run {} started (seed {})", self.runs, self.entities.seed);
    }

    /// Discard the current run and start a fresh one
    pub fn reset(&mut self) {
        self.start();
    }

    /// Flap input; ignored while the run is over
    pub fn flap(&mut self) {
        if self.state.running {
            self.entities.apply_flap();
        }
    }

    /// Apply one event to the run state
    pub fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameOver => {
                if self.state.score > self.state.high_score {
                    // In-memory value first so a failed write never loses it
                    self.state.high_score = self.state.score;
                    log::info!("New high score: {}", self.state.score);
                    self.writer.save(HighScoreRecord::new(self.state.score));
                }
                self.state.running = false;
                log::info!("Game over with score {}", self.state.score);
            }
            GameEvent::Score => {
                self.state.score += 1;
            }
        }
    }

    /// One host-loop tick: lifecycle, simulation step, then event dispatch.
    /// Returns the events handled this tick.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        self.poll_lifecycle();
        if !self.state.running {
            return Vec::new();
        }

        step_in_place(&mut self.entities, dt, &mut self.events);

        let events = self.events.drain();
        for event in &events {
            self.on_event(*event);
        }
        events
    }

    /// Start listening to host lifecycle changes
    pub fn subscribe_lifecycle(&mut self, port: Box<dyn LifecyclePort>) {
        self.lifecycle = Some(port);
    }

    /// Stop listening; returns the port so the host can reuse it
    pub fn unsubscribe_lifecycle(&mut self) -> Option<Box<dyn LifecyclePort>> {
        self.lifecycle.take()
    }

    fn poll_lifecycle(&mut self) {
        let mut pending = Vec::new();
        if let Some(port) = self.lifecycle.as_mut() {
            while let Some(next) = port.poll() {
                pending.push(next);
            }
        }
        for next in pending {
            self.on_app_state_change(next);
        }
    }

    /// React to a host state change; coming back to the foreground rebuilds
    /// the run because the clock may have drifted while suspended
    pub fn on_app_state_change(&mut self, next: AppState) {
        if self.tracker.transition(next) {
            log::info!("Resumed from background, resetting run");
            self.reset();
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Storage backend; blocks while a high score write is in flight
    pub fn storage(&self) -> MutexGuard<'_, S> {
        self.writer.storage()
    }

    /// Wait for queued high score writes to finish
    pub fn flush_writes(&self) {
        self.writer.flush();
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::STORAGE_KEY;
    use crate::persistence::{MemoryStorage, StorageError};
    use crate::platform::ChannelLifecycle;
    use glam::Vec2;
    use proptest::prelude::*;
    use std::time::{Duration, Instant};

    /// Memory storage with a slow write path
    #[derive(Default)]
    struct SlowStorage {
        inner: MemoryStorage,
    }

    impl KeyValueStorage for SlowStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            std::thread::sleep(Duration::from_millis(300));
            self.inner.set_item(key, value)
        }
    }

    fn session() -> GameSession<MemoryStorage> {
        GameSession::new(Tuning::default(), MemoryStorage::new(), 1234)
    }

    /// Play a run to a given score and end it
    fn finish_run(session: &mut GameSession<MemoryStorage>, score: u64) {
        session.reset();
        for _ in 0..score {
            session.on_event(GameEvent::Score);
        }
        session.on_event(GameEvent::GameOver);
    }

    #[test]
    fn test_start_state() {
        let session = session();
        assert_eq!(
            session.state(),
            SessionState {
                running: true,
                score: 0,
                high_score: 0
            }
        );
        assert_eq!(session.runs(), 1);
        assert_eq!(session.entities().player().pos, Vec2::new(200.0, 400.0));
    }

    #[test]
    fn test_loads_stored_high_score() {
        let storage = MemoryStorage::with_item(STORAGE_KEY, r#"{"score":17}"#);
        let session = GameSession::new(Tuning::default(), storage, 1);
        assert_eq!(session.high_score(), 17);
    }

    #[test]
    fn test_malformed_or_unavailable_storage() {
        let storage = MemoryStorage::with_item(STORAGE_KEY, r#"{"score":"lots"}"#);
        assert_eq!(GameSession::new(Tuning::default(), storage, 1).high_score(), 0);

        let mut storage = MemoryStorage::with_item(STORAGE_KEY, r#"{"score":8}"#);
        storage.fail_reads = true;
        assert_eq!(GameSession::new(Tuning::default(), storage, 1).high_score(), 0);
    }

    #[test]
    fn test_score_and_game_over() {
        let mut session = session();
        session.on_event(GameEvent::Score);
        session.on_event(GameEvent::Score);
        assert_eq!(session.score(), 2);
        session.on_event(GameEvent::GameOver);
        assert!(!session.is_running());
        assert_eq!(session.high_score(), 2);
        session.flush_writes();
        assert_eq!(session.storage().raw(STORAGE_KEY), Some(r#"{"score":2}"#));
    }

    #[test]
    fn test_lower_score_not_persisted() {
        let storage = MemoryStorage::with_item(STORAGE_KEY, r#"{"score":5}"#);
        let mut session = GameSession::new(Tuning::default(), storage, 1);
        finish_run(&mut session, 3);
        assert_eq!(session.high_score(), 5);
        session.flush_writes();
        assert_eq!(session.storage().write_count(), 0);
    }

    #[test]
    fn test_failed_write_keeps_memory_value() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let mut session = GameSession::new(Tuning::default(), storage, 1);
        finish_run(&mut session, 4);
        assert_eq!(session.high_score(), 4);
        assert!(!session.is_running());
        // Next run compares against the in-memory value
        finish_run(&mut session, 2);
        assert_eq!(session.high_score(), 4);
    }

    #[test]
    fn test_slow_storage_does_not_stall_tick() {
        let mut session = GameSession::new(Tuning::default(), SlowStorage::default(), 1234);
        session.on_event(GameEvent::Score);

        // No input: the player falls until the run ends
        let mut game_over_ms = None;
        for _ in 0..600 {
            let started = Instant::now();
            let events = session.tick(0.016);
            if events.contains(&GameEvent::GameOver) {
                game_over_ms = Some(started.elapsed().as_millis());
                break;
            }
        }

        let ms = game_over_ms.expect("run should end");
        assert!(ms < 100, "game-over tick took {} ms", ms);
        assert_eq!(session.high_score(), 1);

        session.flush_writes();
        assert_eq!(session.storage().inner.raw(STORAGE_KEY), Some(r#"{"score":1}"#));
    }

    #[test]
    fn test_reset_isolation() {
        let mut session = session();
        for i in 0..90 {
            if i % 12 == 0 {
                session.flap();
            }
            session.tick(0.016);
        }
        let old_seed = session.entities().seed;
        assert_ne!(session.entities().player().pos, Vec2::new(200.0, 400.0));

        session.on_event(GameEvent::Score);
        session.reset();

        let entities = session.entities();
        assert_eq!(session.score(), 0);
        assert!(session.is_running());
        assert_eq!(entities.time_ticks, 0);
        assert_ne!(entities.seed, old_seed);
        assert_eq!(entities.player().pos, Vec2::new(200.0, 400.0));
        assert_eq!(entities.player().vel, Vec2::ZERO);
        assert_eq!(entities.world.bodies().len(), 4 + 2 * 4);
        assert!(entities.obstacles.gates().all(|g| !g.scored && g.x >= 800.0));
    }

    #[test]
    fn test_collision_via_tick() {
        let mut session = session();
        let mut game_overs = 0;
        // No input: the player falls onto the floor
        for _ in 0..600 {
            game_overs += session
                .tick(0.016)
                .iter()
                .filter(|e| **e == GameEvent::GameOver)
                .count();
        }
        assert_eq!(game_overs, 1);
        assert!(!session.is_running());

        // Input and ticks are no-ops while over
        let bodies = session.entities().world.bodies().to_vec();
        session.flap();
        assert!(session.tick(0.016).is_empty());
        assert_eq!(session.entities().world.bodies(), bodies.as_slice());

        session.reset();
        assert!(session.is_running());
    }

    #[test]
    fn test_resume_from_background_resets() {
        let mut session = session();
        let (tx, port) = ChannelLifecycle::channel();
        session.subscribe_lifecycle(Box::new(port));

        for _ in 0..30 {
            session.tick(0.016);
        }
        session.on_event(GameEvent::Score);
        let runs = session.runs();

        tx.send(AppState::Background).unwrap();
        session.tick(0.016);
        assert_eq!(session.runs(), runs);

        tx.send(AppState::Active).unwrap();
        session.tick(0.016);
        assert_eq!(session.runs(), runs + 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.entities().time_ticks, 1);

        // Unsubscribed sessions ignore the host
        assert!(session.unsubscribe_lifecycle().is_some());
        tx.send(AppState::Inactive).unwrap();
        tx.send(AppState::Active).unwrap();
        session.tick(0.016);
        assert_eq!(session.runs(), runs + 1);
    }

    #[test]
    fn test_resume_resets_after_game_over() {
        let mut session = session();
        session.on_event(GameEvent::GameOver);
        session.on_app_state_change(AppState::Inactive);
        session.on_app_state_change(AppState::Active);
        assert!(session.is_running());
    }

    #[test]
    fn test_same_seed_same_runs() {
        let a = GameSession::new(Tuning::default(), MemoryStorage::new(), 99);
        let b = GameSession::new(Tuning::default(), MemoryStorage::new(), 99);
        let gaps = |s: &GameSession<MemoryStorage>| {
            s.entities().obstacles.gates().map(|g| g.gap_center).collect::<Vec<_>>()
        };
        assert_eq!(gaps(&a), gaps(&b));
    }

    proptest! {
        #[test]
        fn prop_high_score_is_running_max(scores in proptest::collection::vec(0u64..50, 1..20)) {
            let mut session = session();
            let mut best = 0;
            for score in scores {
                finish_run(&mut session, score);
                best = best.max(score);
                prop_assert_eq!(session.high_score(), best);
                if best > 0 {
                    session.flush_writes();
                    let stored = HighScoreRecord::load(&*session.storage()).map(|r| r.score);
                    prop_assert_eq!(stored, Some(best));
                }
            }
        }
    }
}
