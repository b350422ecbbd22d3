//! JSON status snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{AppState, Settings, TimerState};
use super::render::phase_label;

/// Full status, emitted as one JSON object per line in `--json` mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub timer: TimerState,
    pub settings: Settings,
    pub phase: String,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn new(timer: TimerState, settings: Settings, state: &AppState) -> Self {
        let (last_action, last_action_time) = state.get_last_action();

        Self {
            phase: phase_label(&timer).to_string(),
            timer,
            settings,
            uptime: state.get_uptime(),
            last_action,
            last_action_time,
            timestamp: Utc::now(),
        }
    }

    /// Snapshot of the current state
    pub fn capture(state: &AppState) -> Result<Self, String> {
        let timer = state.get_timer_state()?;
        let settings = state.get_settings()?;
        Ok(Self::new(timer, settings, state))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!("{{\"error\":\"failed to serialize status: {}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::ManualClock;

    #[test]
    fn snapshot_serializes_timer_and_settings() {
        let state = AppState::new(Settings::new(25, 2).unwrap(), Arc::new(ManualClock::new(0)));
        state.start().unwrap();

        let snapshot = StatusSnapshot::capture(&state).unwrap();
        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json()).unwrap();

        assert_eq!(json["phase"], "running");
        assert_eq!(json["lastAction"], "start");
        assert_eq!(json["timer"]["isRunning"], true);
        assert_eq!(json["timer"]["totalIntervals"], 2);
        assert_eq!(json["settings"]["intervalDurationMinutes"], 25);
    }
}
