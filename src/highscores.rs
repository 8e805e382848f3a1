//! High score record
//!
//! A single best score stored as `{"score": n}` under one fixed key. Reads and
//! writes are best-effort: every failure is logged and swallowed. Writes from
//! a running session go through `HighScoreWriter`, which owns the storage on a
//! background thread so the game loop never waits on it.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::KeyValueStorage;

/// Storage key for the high score
pub const STORAGE_KEY: &str = "gatefall_high_score";

/// The persisted best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighScoreRecord {
    pub score: u64,
}

/// Loose on-disk shape; older writers stored numbers as strings or floats
#[derive(Deserialize)]
struct RawRecord {
    score: Value,
}

impl HighScoreRecord {
    pub fn new(score: u64) -> Self {
        Self { score }
    }

    /// Parse a stored value; anything that is not a non-negative number is absent
    pub fn parse(json: &str) -> Option<Self> {
        let raw: RawRecord = serde_json::from_str(json).ok()?;
        let score = match raw.score {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))?,
            Value::String(s) => parse_leading_integer(&s)?,
            _ => return None,
        };
        Some(Self { score })
    }

    /// Load the high score, treating any failure as "none recorded"
    pub fn load(storage: &dyn KeyValueStorage) -> Option<Self> {
        match storage.get_item(STORAGE_KEY) {
            Ok(Some(json)) => {
                let record = Self::parse(&json);
                match record {
                    Some(r) => log::info!("Loaded high score {}", r.score),
                    None => log::warn!("Ignoring malformed high score record"),
                }
                record
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                None
            }
            Err(e) => {
                log::warn!("High score read failed: {}", e);
                None
            }
        }
    }

    /// Save the high score once; returns whether the write succeeded
    pub fn save(&self, storage: &mut dyn KeyValueStorage) -> bool {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("High score encode failed: {}", e);
                return false;
            }
        };
        match storage.set_item(STORAGE_KEY, &json) {
            Ok(()) => {
                log::info!("High score {} saved", self.score);
                true
            }
            Err(e) => {
                log::warn!("High score write failed: {}", e);
                false
            }
        }
    }
}

enum WriterMsg {
    Save(HighScoreRecord),
    /// Acknowledged once every earlier save has been handled
    Flush(Sender<()>),
}

/// Fire-and-forget high score persistence
pub struct HighScoreWriter<S: KeyValueStorage> {
    storage: Arc<Mutex<S>>,
    /// `None` when the thread could not be started; saves then run inline
    tx: Option<Sender<WriterMsg>>,
    handle: Option<JoinHandle<()>>,
}

impl<S: KeyValueStorage> HighScoreWriter<S> {
    /// Move `storage` onto a dedicated writer thread
    pub fn spawn(storage: S) -> Self {
        let storage = Arc::new(Mutex::new(storage));
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&storage);
        let spawned = thread::Builder::new()
            .name("gatefall-highscore".to_string())
            .spawn(move || run_writer(&shared, rx));

        match spawned {
            Ok(handle) => Self {
                storage,
                tx: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                log::warn!("High score writer thread failed to start ({}), saving inline", e);
                Self {
                    storage,
                    tx: None,
                    handle: None,
                }
            }
        }
    }

    /// Queue a save and return immediately
    pub fn save(&self, record: HighScoreRecord) {
        if let Some(tx) = &self.tx {
            match tx.send(WriterMsg::Save(record)) {
                Ok(()) => return,
                Err(_) => log::warn!("High score writer gone, saving inline"),
            }
        }
        record.save(&mut *lock(&self.storage));
    }

    /// Block until every queued save has been attempted
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if tx.send(WriterMsg::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// The underlying storage; waits for an in-flight write
    pub fn storage(&self) -> MutexGuard<'_, S> {
        lock(&self.storage)
    }
}

impl<S: KeyValueStorage> Drop for HighScoreWriter<S> {
    fn drop(&mut self) {
        // Closing the channel lets the thread finish the backlog and exit
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("High score writer thread panicked");
            }
        }
    }
}

fn run_writer<S: KeyValueStorage>(storage: &Mutex<S>, rx: Receiver<WriterMsg>) {
    for msg in rx {
        match msg {
            WriterMsg::Save(record) => {
                record.save(&mut *lock(storage));
            }
            WriterMsg::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

fn lock<S>(storage: &Mutex<S>) -> MutexGuard<'_, S> {
    storage.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Integer prefix of a string ("12", " 12 ", "12.9" and "12abc" give 12)
fn parse_leading_integer(s: &str) -> Option<u64> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
