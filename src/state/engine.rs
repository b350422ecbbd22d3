//! Interval timer engine
//!
//! The engine is a wall-clock driven state machine with no threads and no
//! I/O of its own. Every operation that depends on time takes the current
//! clock reading explicitly, and [`IntervalTimer::tick`] hands back the
//! intervals that finished instead of calling anyone. Scheduling ticks and
//! delivering completion notifications is the caller's job.
//!
//! Elapsed time is always reconstructed from an absolute anchor:
//!
//! ```text
//! elapsed = (now - interval_started_at) + paused_accumulated_ms
//! ```
//!
//! so a late, duplicated or skipped tick produces the same state as a
//! perfectly regular 100 ms cadence.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    clock::Millis,
    settings::Settings,
    timer_state::{CompletedInterval, TimerState},
};

/// Emitted by [`IntervalTimer::tick`] for every interval boundary crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalCompleted {
    pub interval: u32,
    pub completed_at: Millis,
    /// Set on the event for the final interval of the session
    pub session_complete: bool,
}

/// Core interval timer
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    settings: Settings,
    state: TimerState,
    /// Start of the current run segment; `None` before the first start and after reset
    interval_started_at: Option<Millis>,
    /// Progress frozen by the last pause, folded back into the anchor on resume
    paused_accumulated_ms: u64,
}

impl IntervalTimer {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: TimerState::new(&settings),
            settings,
            interval_started_at: None,
            paused_accumulated_ms: 0,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Start or resume the current interval.
    ///
    /// Returns `false` without touching anything when the timer is already
    /// running or the session is finished.
    pub fn start(&mut self, now: Millis) -> bool {
        if self.state.is_running
            || self.state.is_complete()
            || self.state.current_interval > self.state.total_intervals
        {
            return false;
        }

        let anchor = match self.interval_started_at {
            None => now,
            // Resume: rebase so that now - anchor equals the frozen progress
            Some(_) => now.saturating_sub(self.paused_accumulated_ms),
        };
        self.interval_started_at = Some(anchor);
        self.paused_accumulated_ms = 0;
        self.state.is_running = true;

        debug!(
            "Interval {} running, anchored at {}",
            self.state.current_interval, anchor
        );
        true
    }

    /// Freeze progress. Returns `false` if the timer was not running.
    pub fn pause(&mut self, now: Millis) -> bool {
        if !self.state.is_running {
            return false;
        }

        if let Some(anchor) = self.interval_started_at {
            self.paused_accumulated_ms = now.saturating_sub(anchor);
        }
        self.state.is_running = false;

        debug!(
            "Interval {} paused after {}ms",
            self.state.current_interval, self.paused_accumulated_ms
        );
        true
    }

    /// Re-evaluate remaining time against the clock.
    ///
    /// Every interval whose end lies at or before `now` is recorded, in
    /// order, and reported in the returned list. The next interval is
    /// anchored at the exact boundary rather than at `now`, so one tick
    /// after a long gap catches up across several intervals.
    pub fn tick(&mut self, now: Millis) -> Vec<IntervalCompleted> {
        let mut completions = Vec::new();
        if !self.state.is_running {
            return completions;
        }

        let duration = self.state.interval_duration_ms;

        while let Some(anchor) = self.interval_started_at {
            let elapsed = now.saturating_sub(anchor) + self.paused_accumulated_ms;

            if elapsed < duration {
                self.state.time_remaining_ms = duration - elapsed;
                self.state.total_elapsed_ms = self.elapsed_before_current() + elapsed;
                break;
            }

            let interval = self.state.current_interval;
            let completed_at = anchor + duration.saturating_sub(self.paused_accumulated_ms);
            let session_complete = interval >= self.state.total_intervals;

            self.state.completed_intervals.push(CompletedInterval {
                interval,
                completed_at,
            });
            completions.push(IntervalCompleted {
                interval,
                completed_at,
                session_complete,
            });
            self.paused_accumulated_ms = 0;

            if session_complete {
                self.interval_started_at = None;
                self.state.is_running = false;
                self.state.time_remaining_ms = 0;
                self.state.total_elapsed_ms = self.elapsed_before_current();
                debug!("Session complete after {} intervals", interval);
            } else {
                self.interval_started_at = Some(completed_at);
                self.state.current_interval = interval + 1;
                self.state.time_remaining_ms = duration;
                self.state.total_elapsed_ms = self.elapsed_before_current();
                debug!("Interval {} complete, advancing to {}", interval, interval + 1);
            }
        }

        completions
    }

    /// Back to the first interval with an empty history
    pub fn reset(&mut self) {
        self.interval_started_at = None;
        self.paused_accumulated_ms = 0;
        self.state = TimerState::new(&self.settings);
    }

    /// Apply new settings; any session in progress is discarded
    pub fn reconfigure(&mut self, settings: Settings) {
        self.settings = settings;
        self.reset();
    }

    fn elapsed_before_current(&self) -> u64 {
        self.state.completed_intervals.len() as u64 * self.state.interval_duration_ms
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
