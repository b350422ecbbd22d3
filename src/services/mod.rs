//! External side effects module
//!
//! This module contains the alarm fired when an interval completes.

pub mod alarm;

// Re-export main functions
pub use alarm::*;
