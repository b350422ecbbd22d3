//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

use crate::{
    console::commands::OutputFormat,
    services::AlarmConfig,
    state::{settings, Settings},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "interval-timer")]
#[command(about = "A drift-free interval countdown timer for the terminal")]
#[command(version)]
pub struct Config {
    /// Length of each interval in minutes
    #[arg(
        short,
        long,
        default_value_t = settings::DEFAULT_INTERVAL_DURATION_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(settings::MAX_INTERVAL_DURATION_MINUTES))
    )]
    pub minutes: u32,

    /// Number of intervals in a session
    #[arg(
        short,
        long,
        default_value_t = settings::DEFAULT_TOTAL_INTERVALS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(settings::MAX_TOTAL_INTERVALS))
    )]
    pub intervals: u32,

    /// Timer re-evaluation cadence in milliseconds
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub tick_ms: u64,

    /// Shell command to run when an interval completes
    #[arg(long)]
    pub alarm_cmd: Option<String>,

    /// Do not ring the terminal bell on completion
    #[arg(long)]
    pub no_bell: bool,

    /// Emit status as JSON lines instead of a live countdown
    #[arg(long)]
    pub json: bool,

    /// Start the first interval immediately
    #[arg(short, long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Timer settings from the command line
    pub fn settings(&self) -> Result<Settings, String> {
        Settings::new(self.minutes, self.intervals)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// The bell is suppressed in JSON mode to keep stdout machine readable
    pub fn alarm(&self) -> AlarmConfig {
        AlarmConfig::new(self.alarm_cmd.clone(), !self.no_bell && !self.json)
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json { OutputFormat::Json } else { OutputFormat::Text }
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_defaults() {
        let config = Config::try_parse_from(["interval-timer"]).unwrap();
        assert_eq!(config.settings().unwrap(), Settings::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.output_format(), OutputFormat::Text);
        assert!(config.alarm().bell);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn parses_custom_session() {
        let config = Config::try_parse_from([
            "interval-timer", "-m", "25", "-i", "8", "--json", "--alarm-cmd", "paplay bell.wav",
        ])
        .unwrap();
        assert_eq!(config.settings().unwrap(), Settings::new(25, 8).unwrap());
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert_eq!(config.alarm().command.as_deref(), Some("paplay bell.wav"));
        assert!(!config.alarm().bell);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Config::try_parse_from(["interval-timer", "--minutes", "0"]).is_err());
        assert!(Config::try_parse_from(["interval-timer", "--minutes", "481"]).is_err());
        assert!(Config::try_parse_from(["interval-timer", "--intervals", "11"]).is_err());
    }
}
