//! Contact detection for the rigid-body world
//!
//! Only the player moves under physics, so the narrow phase checks the
//! player against every other body. A contact is reported when a pair starts
//! overlapping, not while it keeps overlapping.

use std::collections::BTreeSet;

use super::body::{Body, BodyId};

/// A pair of bodies that started touching this step (player first)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactBegin {
    pub a: BodyId,
    pub b: BodyId,
}

/// Tracks which pairs overlapped on the previous step
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    active: BTreeSet<(BodyId, BodyId)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute overlaps for `subject` and return the pairs that are new
    pub fn update(&mut self, subject: &Body, others: &[Body]) -> Vec<ContactBegin> {
        let bounds = subject.aabb();
        let mut now = BTreeSet::new();
        let mut began = Vec::new();

        for other in others {
            if other.id == subject.id {
                continue;
            }
            if bounds.overlaps(&other.aabb()) {
                let pair = (subject.id, other.id);
                if !self.active.contains(&pair) {
                    began.push(ContactBegin {
                        a: subject.id,
                        b: other.id,
                    });
                }
                now.insert(pair);
            }
        }

        self.active = now;
        began
    }

    /// Number of pairs currently overlapping
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
