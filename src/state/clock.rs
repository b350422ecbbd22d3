//! Clock sources for the timer engine

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};
use chrono::{DateTime, Local, Utc};

/// Milliseconds since the Unix epoch
pub type Millis = u64;

/// Source of the current time
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds. Never goes backwards.
    fn now(&self) -> Millis;
}

/// Wall-clock anchored, monotonic clock.
///
/// The epoch offset is sampled once and all later readings advance by
/// `Instant` deltas, so adjustments to the system clock cannot make the
/// timer jump.
#[derive(Debug)]
pub struct SystemClock {
    epoch_ms: Millis,
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch_ms: Utc::now().timestamp_millis().max(0) as Millis,
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.epoch_ms + self.origin.elapsed().as_millis() as Millis
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Millis) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

/// Convert a clock reading into local time for display
pub fn to_local(timestamp: Millis) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(timestamp as i64).map(|t| t.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
        assert!(first > 1_600_000_000_000);
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(250);
        assert_eq!(clock.now(), 1_250);
        clock.set(5_000);
        assert_eq!(clock.now(), 5_000);
    }
}
