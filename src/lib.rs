//! Interval Timer - A drift-free interval countdown timer
//!
//! This library provides the interval timer engine, the shared state that
//! wraps it, and the background tasks and terminal front end that drive it.

pub mod config;
pub mod console;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, IntervalTimer, Settings, TimerState};
pub use utils::signals::shutdown_signal;
