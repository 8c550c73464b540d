//! Debounce primitive for scroll-driven window recomputation.
//!
//! ## Usage
//!
//! The engine owns one of these; hosts that drive their own recompute loop
//! can use it directly. Time is passed in explicitly so the behavior is
//! deterministic under test.
use std::time::{Duration, Instant};

use tracing::warn;

/// Gate that admits at most one recompute per interval.
///
/// A begun recompute must be finished with [`Debounce::finish`]. If a
/// recompute flag is left stuck longer than the interval, the next
/// [`Debounce::try_begin`] force-resets it and proceeds, so a lost
/// completion can never stall recomputation permanently.
#[derive(Debug, Clone)]
pub struct Debounce {
    interval: Duration,
    busy: bool,
    last_began: Option<Instant>,
}

impl Debounce {
    /// Creates a gate with the given minimum interval between recomputes.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            busy: false,
            last_began: None,
        }
    }

    /// Whether a recompute is currently marked in progress.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Attempts to begin a recompute at `now`.
    ///
    /// Returns `false` while a recompute is in progress or the interval
    /// since the last recompute began has not elapsed.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if self.busy {
            let stuck = self
                .last_began
                .is_none_or(|began| now.saturating_duration_since(began) >= self.interval);
            if !stuck {
                return false;
            }
            warn!("recompute flag stuck past the debounce interval, force-resetting");
            self.busy = false;
        }
        if let Some(began) = self.last_began
            && now.saturating_duration_since(began) < self.interval
        {
            return false;
        }
        self.busy = true;
        self.last_began = Some(now);
        true
    }

    /// Marks the current recompute finished.
    pub fn finish(&mut self) {
        self.busy = false;
    }

    /// Clears all timing state, as part of a full engine reset.
    pub fn reset(&mut self) {
        self.busy = false;
        self.last_began = None;
    }
}
