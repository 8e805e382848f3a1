//! Gatefall headless runner
//!
//! Drives a session with a fixed-step accumulator loop and a simple autopilot.
//! Rendering is left to a presentation layer; this binary only logs.
//!
//! Usage: `gatefall [RUNS] [TUNING_JSON]`

use std::path::PathBuf;

use gatefall::consts::*;
use gatefall::persistence::{FileStorage, KeyValueStorage};
use gatefall::sim::GameEvent;
use gatefall::{GameSession, Tuning};

/// Simulated frame length fed to the host loop
const FRAME_TIME: f32 = 1.0 / 60.0;
/// Give up on a run after this many simulated frames
const MAX_FRAMES_PER_RUN: u32 = 60 * 180;

/// Fixed-step host loop state
struct HostLoop {
    accumulator: f32,
    frames: u32,
}

impl HostLoop {
    fn new() -> Self {
        Self {
            accumulator: 0.0,
            frames: 0,
        }
    }

    /// Run simulation ticks for one frame; returns events handled
    fn update<S: KeyValueStorage>(&mut self, session: &mut GameSession<S>, dt: f32) -> Vec<GameEvent> {
        let dt = dt.min(MAX_FRAME_TIME);
        self.accumulator += dt;
        self.frames += 1;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if autopilot_wants_flap(session) {
                session.flap();
            }
            events.extend(session.tick(SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        events
    }
}

/// Flap when falling below the centre of the next gap
fn autopilot_wants_flap<S: KeyValueStorage>(session: &GameSession<S>) -> bool {
    let entities = session.entities();
    let player = entities.player();
    let target = entities
        .obstacles
        .next_gate_after(player.left())
        .map(|g| g.gap_center + entities.obstacles.gap_height() / 4.0)
        .unwrap_or(session.tuning().viewport_height / 2.0);
    player.pos.y > target && player.vel.y > 0.0
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Gatefall (headless) starting...");

    let mut args = std::env::args().skip(1);
    let runs: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let tuning = match args.next() {
        Some(path) => Tuning::load(&PathBuf::from(path)),
        None => Tuning::default(),
    };

    let data_dir = std::env::var_os("GATEFALL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".gatefall"));
    let storage = FileStorage::new(data_dir);

    let mut session = GameSession::with_entropy(tuning, storage);
    for run in 1..=runs {
        if run > 1 {
            session.reset();
        }
        let mut host = HostLoop::new();
        while session.is_running() && host.frames < MAX_FRAMES_PER_RUN {
            for event in host.update(&mut session, FRAME_TIME) {
                if event == GameEvent::Score {
                    log::debug!("Score: {}", session.score());
                }
            }
        }
        println!(
            "Run {}: score {} (high score {}, {} frames)",
            run,
            session.score(),
            session.high_score(),
            host.frames
        );
    }

    session.flush_writes();
    log::info!("Stored high scores in {}", session.storage().dir().display());
}
