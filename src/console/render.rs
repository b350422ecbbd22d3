//! Text rendering of the timer state

use std::io::Write;
use tracing::debug;

use crate::state::{clock::to_local, Settings, TimerState};

const PROGRESS_WIDTH: usize = 20;

/// Format milliseconds as `H:MM:SS`, rounding down to whole seconds
pub fn format_clock(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// Progress through the current interval as a whole percentage, 0 to 100
pub fn progress_percent(state: &TimerState) -> u8 {
    (state.progress() * 100.0).floor().clamp(0.0, 100.0) as u8
}

pub fn progress_bar(state: &TimerState, width: usize) -> String {
    let filled = ((state.progress() * width as f64).floor() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One dot per interval: filled for completed, hollow for pending
pub fn status_dots(state: &TimerState) -> String {
    (0..state.total_intervals)
        .map(|i| if i < state.completed_count() { '●' } else { '○' })
        .collect()
}

/// Short label for what the timer is doing
pub fn phase_label(state: &TimerState) -> &'static str {
    if state.is_complete() {
        "done"
    } else if state.is_running {
        "running"
    } else if state.total_elapsed_ms > 0 || state.time_remaining_ms < state.interval_duration_ms {
        "paused"
    } else {
        "ready"
    }
}

/// Single-line countdown display
pub fn status_line(state: &TimerState) -> String {
    format!(
        "{}  Interval {} of {}  {}  {} {:>3}%  Total: {} / {}  ({})",
        status_dots(state),
        state.current_interval,
        state.total_intervals,
        format_clock(state.time_remaining_ms),
        progress_bar(state, PROGRESS_WIDTH),
        progress_percent(state),
        format_clock(state.total_elapsed_ms),
        format_clock(state.total_duration_ms()),
        phase_label(state),
    )
}

/// Interval history, one line per interval of the session
pub fn history_lines(state: &TimerState) -> Vec<String> {
    (1..=state.total_intervals)
        .map(|interval| match state.completion_of(interval) {
            Some(completed) => {
                let at = to_local(completed.completed_at)
                    .map(|t| t.format("%-I:%M %p").to_string())
                    .unwrap_or_else(|| "unknown time".to_string());
                format!("● Interval {}  Completed at {}", interval, at)
            }
            None => format!("○ Interval {}  Pending", interval),
        })
        .collect()
}

/// Multi-line status report for the `status` command
pub fn status_report(state: &TimerState, settings: &Settings) -> String {
    format!("{}\n{}", settings.describe(), status_line(state))
}

pub fn help_text() -> &'static str {
    "Commands:\n  \
     start, s              start or resume the timer\n  \
     pause, p              pause the timer\n  \
     toggle, t, <enter>    start if paused, pause if running\n  \
     reset, r              discard progress and return to interval 1\n  \
     set <min> <count>     change interval length (1-480) and count (1-10)\n  \
     status                show the current state\n  \
     history               list completed intervals\n  \
     alarm                 play the completion alarm\n  \
     stop                  silence a playing alarm\n  \
     help, h, ?            show this help\n  \
     quit, q               exit"
}

/// Print a message on its own line, clearing any in-place status line
pub fn print_message(message: &str) {
    let mut stdout = std::io::stdout();
    if let Err(e) = writeln!(stdout, "\r\x1b[K{}", message).and_then(|_| stdout.flush()) {
        debug!("Failed to write message to stdout: {}", e);
    }
}

/// Redraw the in-place status line
pub fn print_status_line(line: &str) {
    let mut stdout = std::io::stdout();
    if let Err(e) = write!(stdout, "\r\x1b[K{}", line).and_then(|_| stdout.flush()) {
        debug!("Failed to draw status line: {}", e);
    }
}

/// Output produced for one observed state
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// One-off announcements such as interval completion
    pub notices: Vec<String>,
    /// New status line, if it differs from the last one drawn
    pub status: Option<String>,
}

/// Turns a stream of timer states into display frames.
///
/// Remembers what was already shown so each completion is announced once
/// and the status line is only redrawn when its text changes.
#[derive(Debug, Default)]
pub struct Renderer {
    last_line: Option<String>,
    announced: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&mut self, state: &TimerState) -> Frame {
        let mut notices = Vec::new();

        let completed = state.completed_intervals.len();
        if completed < self.announced {
            // history shrank: reset or reconfigure
            self.announced = 0;
        }
        for completion in &state.completed_intervals[self.announced..] {
            notices.push(format!(
                "Interval {} of {} completed!",
                completion.interval, state.total_intervals
            ));
        }
        if completed > self.announced && state.is_complete() {
            notices.push(format!(
                "All intervals completed! 🎉 You finished all {} intervals.",
                state.total_intervals
            ));
        }
        self.announced = completed;

        let line = status_line(state);
        let status = if self.last_line.as_deref() == Some(line.as_str()) {
            None
        } else {
            self.last_line = Some(line.clone());
            Some(line)
        };

        Frame { notices, status }
    }
}
