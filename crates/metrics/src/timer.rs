//! Checkpoint timer
//!
//! `checkpoint` measures from the previous reading, `end` measures from
//! the start. Both move `last` forward. Durations come straight from the
//! clock, so a clock stepping backwards yields negative values.

use crate::clock::SharedClock;
use std::collections::BTreeMap;

/// Per-UoW timer
///
/// Cloning copies `start`, `last` and every recorded checkpoint; the clone
/// evolves independently afterwards.
#[derive(Debug, Clone)]
pub struct Timer {
    start: i64,
    last: i64,
    checkpoints: BTreeMap<String, i64>,
    clock: SharedClock,
}

impl Timer {
    /// Create a timer whose start and last reading are `start`
    pub fn new(start: i64, clock: SharedClock) -> Self {
        Self {
            start,
            last: start,
            checkpoints: BTreeMap::new(),
            clock,
        }
    }

    /// Record `now - last` under `key`
    pub fn checkpoint(&mut self, key: impl Into<String>) -> i64 {
        let now = self.clock.now_millis();
        let elapsed = now - self.last;
        self.last = now;
        self.checkpoints.insert(key.into(), elapsed);
        elapsed
    }

    /// Record `now - start` under `key`
    pub fn end(&mut self, key: impl Into<String>) -> i64 {
        let now = self.clock.now_millis();
        let elapsed = now - self.start;
        self.last = now;
        self.checkpoints.insert(key.into(), elapsed);
        elapsed
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    pub fn last(&self) -> i64 {
        self.last
    }

    /// Recorded checkpoint for `key`
    pub fn get(&self, key: &str) -> Option<i64> {
        self.checkpoints.get(key).copied()
    }

    /// All checkpoints ordered by key
    pub fn checkpoints(&self) -> &BTreeMap<String, i64> {
        &self.checkpoints
    }

    /// Clock this timer reads from
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }
}

#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;
