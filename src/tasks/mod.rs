//! Background tasks module
//!
//! These tasks are the scheduling collaborators of the timer engine: the
//! periodic ticker, foreground-resume reconciliation and deferred
//! completion delivery.

pub mod completion_notifier;
pub mod foreground_resume;
pub mod ticker;

// Re-export main functions
pub use completion_notifier::completion_notifier_task;
pub use foreground_resume::foreground_resume_task;
pub use ticker::{ticker_task, DEFAULT_TICK_INTERVAL};
