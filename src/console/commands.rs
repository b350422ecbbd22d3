//! Console command parsing and handlers

use std::str::FromStr;
use tracing::{error, info, warn};

use crate::{
    services::Alarm,
    state::{AppState, Settings},
};
use super::{render, snapshot::StatusSnapshot};

/// A command typed on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    Set { minutes: u32, intervals: u32 },
    Status,
    History,
    Alarm,
    StopAlarm,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let Some(name) = words.next() else {
            // Bare enter toggles
            return Ok(Command::Toggle);
        };

        let command = match name.to_lowercase().as_str() {
            "start" | "s" | "resume" => Command::Start,
            "pause" | "p" => Command::Pause,
            "toggle" | "t" => Command::Toggle,
            "reset" | "r" => Command::Reset,
            "set" => {
                let minutes = parse_number(words.next(), "minutes")?;
                let intervals = parse_number(words.next(), "intervals")?;
                Command::Set { minutes, intervals }
            }
            "status" => Command::Status,
            "history" => Command::History,
            "alarm" => Command::Alarm,
            "stop" => Command::StopAlarm,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{}', type 'help' for a list", other)),
        };

        if words.next().is_some() {
            return Err(format!("Too many arguments for '{}'", name));
        }

        Ok(command)
    }
}

fn parse_number(word: Option<&str>, what: &str) -> Result<u32, String> {
    let word = word.ok_or_else(|| format!("Usage: set <minutes> <intervals> (missing {})", what))?;
    word.parse()
        .map_err(|_| format!("Invalid {} '{}': expected a positive whole number", what, word))
}

/// Result of handling a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Quit,
}

/// Output format for console replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Dispatch a parsed command against the application state
pub fn handle_command(
    state: &AppState,
    command: Command,
    format: OutputFormat,
    alarm: &Alarm,
) -> Result<Reply, String> {
    match command {
        Command::Start => start_handler(state),
        Command::Pause => pause_handler(state),
        Command::Toggle => toggle_handler(state),
        Command::Reset => reset_handler(state),
        Command::Set { minutes, intervals } => set_handler(state, minutes, intervals),
        Command::Status => status_handler(state, format),
        Command::History => history_handler(state),
        Command::Alarm => {
            info!("Testing alarm");
            alarm.play()?;
            Ok(Reply::Message("Alarm test played".to_string()))
        }
        Command::StopAlarm => {
            let message = if alarm.stop()? { "Alarm stopped" } else { "No alarm playing" };
            Ok(Reply::Message(message.to_string()))
        }
        Command::Help => Ok(Reply::Message(render::help_text().to_string())),
        Command::Quit => Ok(Reply::Quit),
    }
}

fn start_handler(state: &AppState) -> Result<Reply, String> {
    let before = state.get_timer_state()?;
    if before.is_complete() {
        return Ok(Reply::Message(
            "Session complete. Use 'reset' to start a new one.".to_string(),
        ));
    }
    if before.is_running {
        return Ok(Reply::Message("Timer is already running".to_string()));
    }

    let timer = state.start()?;
    Ok(Reply::Message(format!("Interval {} of {} running", timer.current_interval, timer.total_intervals)))
}

fn pause_handler(state: &AppState) -> Result<Reply, String> {
    if !state.get_timer_state()?.is_running {
        return Ok(Reply::Message("Timer is not running".to_string()));
    }

    let timer = state.pause()?;
    if timer.is_complete() {
        return Ok(Reply::Message("Session already complete".to_string()));
    }
    Ok(Reply::Message(format!(
        "Paused with {} remaining",
        render::format_clock(timer.time_remaining_ms)
    )))
}

fn toggle_handler(state: &AppState) -> Result<Reply, String> {
    if state.get_timer_state()?.is_running {
        pause_handler(state)
    } else {
        start_handler(state)
    }
}

fn reset_handler(state: &AppState) -> Result<Reply, String> {
    let timer = state.reset()?;
    Ok(Reply::Message(format!(
        "Timer reset: {} to go",
        render::format_clock(timer.time_remaining_ms)
    )))
}

fn set_handler(state: &AppState, minutes: u32, intervals: u32) -> Result<Reply, String> {
    // Settings are locked while a session is counting down
    if state.get_timer_state()?.is_running {
        warn!("Settings change rejected while timer is running");
        return Ok(Reply::Message("Pause the timer before changing settings".to_string()));
    }

    let settings = match Settings::new(minutes, intervals) {
        Ok(settings) => settings,
        Err(e) => return Ok(Reply::Message(e)),
    };

    state.reconfigure(settings)?;
    Ok(Reply::Message(format!("Settings updated: {}", settings.describe())))
}

fn status_handler(state: &AppState, format: OutputFormat) -> Result<Reply, String> {
    let message = match format {
        OutputFormat::Json => StatusSnapshot::capture(state)?.to_json(),
        OutputFormat::Text => {
            let timer = state.get_timer_state()?;
            let settings = state.get_settings()?;
            let (last_action, last_action_time) = state.get_last_action();
            let mut report = render::status_report(&timer, &settings);
            if let (Some(action), Some(at)) = (last_action, last_action_time) {
                report.push_str(&format!(
                    "\nLast action: {} at {}",
                    action,
                    at.with_timezone(&chrono::Local).format("%-I:%M:%S %p")
                ));
            }
            report.push_str(&format!("\nUptime: {}", state.get_uptime()));
            report
        }
    };
    Ok(Reply::Message(message))
}

fn history_handler(state: &AppState) -> Result<Reply, String> {
    let timer = state.get_timer_state()?;
    let mut lines = vec!["Interval History".to_string()];
    lines.extend(render::history_lines(&timer));
    Ok(Reply::Message(lines.join("\n")))
}

/// Parse and run one input line, reporting failures as messages
pub fn handle_line(
    state: &AppState,
    line: &str,
    format: OutputFormat,
    alarm: &Alarm,
) -> Reply {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => return Reply::Message(e),
    };

    match handle_command(state, command, format, alarm) {
        Ok(reply) => reply,
        Err(e) => {
            error!("Failed to handle {:?}: {}", command, e);
            Reply::Message(format!("Error: {}", e))
        }
    }
}
