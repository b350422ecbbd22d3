//! Observable timer state

use serde::{Deserialize, Serialize};

use super::{clock::Millis, settings::Settings};

/// Record of a finished interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedInterval {
    /// 1-based interval index
    pub interval: u32,
    pub completed_at: Millis,
}

/// Timer state as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    pub current_interval: u32,
    pub total_intervals: u32,
    pub interval_duration_ms: u64,
    pub time_remaining_ms: u64,
    pub completed_intervals: Vec<CompletedInterval>,
    pub total_elapsed_ms: u64,
}

impl TimerState {
    /// Fresh, not-running state for the given settings
    pub fn new(settings: &Settings) -> Self {
        let interval_duration_ms = settings.interval_duration_ms();

        Self {
            is_running: false,
            current_interval: 1,
            total_intervals: settings.total_intervals,
            interval_duration_ms,
            time_remaining_ms: interval_duration_ms,
            completed_intervals: Vec::new(),
            total_elapsed_ms: 0,
        }
    }

    /// True once every interval of the session has finished
    pub fn is_complete(&self) -> bool {
        self.completed_intervals.len() as u32 >= self.total_intervals
    }

    pub fn completed_count(&self) -> u32 {
        self.completed_intervals.len() as u32
    }

    /// Look up the completion record for a 1-based interval index
    pub fn completion_of(&self, interval: u32) -> Option<&CompletedInterval> {
        self.completed_intervals.iter().find(|c| c.interval == interval)
    }

    /// Progress through the current interval, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.interval_duration_ms == 0 {
            return 0.0;
        }
        let done = self.interval_duration_ms.saturating_sub(self.time_remaining_ms);
        (done as f64 / self.interval_duration_ms as f64).clamp(0.0, 1.0)
    }

    /// Length of the whole session
    pub fn total_duration_ms(&self) -> u64 {
        self.interval_duration_ms * u64::from(self.total_intervals)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
