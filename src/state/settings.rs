//! Timer settings and their validation

use serde::{Deserialize, Serialize};

/// Default interval length: 2h 15min
pub const DEFAULT_INTERVAL_DURATION_MINUTES: u32 = 135;
pub const DEFAULT_TOTAL_INTERVALS: u32 = 4;

/// Longest interval the configuration surface accepts (8 hours)
pub const MAX_INTERVAL_DURATION_MINUTES: u32 = 480;
pub const MAX_TOTAL_INTERVALS: u32 = 10;

const MS_PER_MINUTE: u64 = 60 * 1000;

/// Session settings: how long each interval lasts and how many there are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub interval_duration_minutes: u32,
    pub total_intervals: u32,
}

impl Settings {
    /// Create validated settings.
    ///
    /// Both values must be positive; the duration is limited to
    /// 1..=480 minutes and the interval count to 1..=10.
    pub fn new(interval_duration_minutes: u32, total_intervals: u32) -> Result<Self, String> {
        if !(1..=MAX_INTERVAL_DURATION_MINUTES).contains(&interval_duration_minutes) {
            return Err(format!(
                "Interval duration must be between 1 and {} minutes, got {}",
                MAX_INTERVAL_DURATION_MINUTES, interval_duration_minutes
            ));
        }
        if !(1..=MAX_TOTAL_INTERVALS).contains(&total_intervals) {
            return Err(format!(
                "Number of intervals must be between 1 and {}, got {}",
                MAX_TOTAL_INTERVALS, total_intervals
            ));
        }

        Ok(Self {
            interval_duration_minutes,
            total_intervals,
        })
    }

    /// Duration of a single interval in milliseconds
    pub fn interval_duration_ms(&self) -> u64 {
        u64::from(self.interval_duration_minutes) * MS_PER_MINUTE
    }

    /// Human readable summary, e.g. "4 intervals × 2h 15m each"
    pub fn describe(&self) -> String {
        let hours = self.interval_duration_minutes / 60;
        let minutes = self.interval_duration_minutes % 60;
        let noun = if self.total_intervals == 1 { "interval" } else { "intervals" };

        format!("{} {} × {}h {}m each", self.total_intervals, noun, hours, minutes)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_duration_minutes: DEFAULT_INTERVAL_DURATION_MINUTES,
            total_intervals: DEFAULT_TOTAL_INTERVALS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_135_minutes_by_4() {
        let settings = Settings::default();
        assert_eq!(settings.interval_duration_minutes, 135);
        assert_eq!(settings.total_intervals, 4);
        assert_eq!(settings.interval_duration_ms(), 135 * 60_000);
    }

    #[test]
    fn accepts_range_bounds() {
        assert!(Settings::new(1, 1).is_ok());
        assert!(Settings::new(480, 10).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Settings::new(0, 4).is_err());
        assert!(Settings::new(481, 4).is_err());
        assert!(Settings::new(25, 0).is_err());
        let err = Settings::new(25, 11).unwrap_err();
        assert!(err.contains("between 1 and 10"));
    }

    #[test]
    fn describe_formats_hours_and_minutes() {
        assert_eq!(Settings::default().describe(), "4 intervals × 2h 15m each");
        let single = Settings::new(25, 1).unwrap();
        assert_eq!(single.describe(), "1 interval × 0h 25m each");
    }
}
