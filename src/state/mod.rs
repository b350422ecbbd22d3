//! State management module
//!
//! This module contains the timer engine, its data types and the shared
//! application state that wraps it.

pub mod app_state;
pub mod clock;
pub mod engine;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, CompletionListener};
pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use engine::{IntervalCompleted, IntervalTimer};
pub use settings::Settings;
pub use timer_state::{CompletedInterval, TimerState};
