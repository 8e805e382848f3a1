//! Platform abstraction layer
//!
//! Handles host lifecycle signals (foreground/background). The session
//! subscribes to a `LifecyclePort` and polls it once per tick.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

/// Host application state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppState {
    #[default]
    Active,
    /// Visible but not receiving input (e.g. a system overlay)
    Inactive,
    Background,
}

impl AppState {
    pub fn is_suspended(&self) -> bool {
        matches!(self, AppState::Inactive | AppState::Background)
    }
}

/// Source of lifecycle changes
pub trait LifecyclePort {
    /// Next pending state change, if any
    fn poll(&mut self) -> Option<AppState>;
}

/// Remembers the last state and detects the suspended -> active edge
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleTracker {
    current: AppState,
}

impl LifecycleTracker {
    pub fn current(&self) -> AppState {
        self.current
    }

    /// Record a new state; true when the host just came back to the foreground
    pub fn transition(&mut self, next: AppState) -> bool {
        let resumed = self.current.is_suspended() && next == AppState::Active;
        self.current = next;
        resumed
    }
}

/// Channel-backed port; the host keeps the sender
#[derive(Debug)]
pub struct ChannelLifecycle {
    rx: Receiver<AppState>,
}

impl ChannelLifecycle {
    pub fn channel() -> (Sender<AppState>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl LifecyclePort for ChannelLifecycle {
    fn poll(&mut self) -> Option<AppState> {
        // A dropped sender just means no more signals
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_edge() {
        let mut tracker = LifecycleTracker::default();
        assert!(!tracker.transition(AppState::Active));
        assert!(!tracker.transition(AppState::Background));
        assert!(tracker.transition(AppState::Active));
        assert!(!tracker.transition(AppState::Inactive));
        assert!(!tracker.transition(AppState::Background));
        assert!(tracker.transition(AppState::Active));
        assert_eq!(tracker.current(), AppState::Active);
    }

    #[test]
    fn test_channel_port() {
        let (tx, mut port) = ChannelLifecycle::channel();
        assert_eq!(port.poll(), None);
        tx.send(AppState::Background).unwrap();
        tx.send(AppState::Active).unwrap();
        assert_eq!(port.poll(), Some(AppState::Background));
        assert_eq!(port.poll(), Some(AppState::Active));
        assert_eq!(port.poll(), None);
        drop(tx);
        assert_eq!(port.poll(), None);
    }
}
