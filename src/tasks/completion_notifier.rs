//! Deferred delivery of interval completions

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, warn};

use crate::state::{AppState, IntervalCompleted};

/// Background task that invokes the completion listener once per queued
/// completion event.
///
/// Runs on its own scheduling turn, after the engine has committed the
/// transition that produced the event. The receiver must be subscribed
/// before any command can complete an interval.
pub async fn completion_notifier_task(
    state: Arc<AppState>,
    mut completions: broadcast::Receiver<IntervalCompleted>,
) {
    debug!("Starting completion notifier task");

    loop {
        match completions.recv().await {
            Ok(completion) => {
                debug!(
                    "Delivering completion of interval {} (session complete: {})",
                    completion.interval, completion.session_complete
                );
                match state.notify_completion() {
                    Ok(true) => {}
                    Ok(false) => debug!("No completion listener registered"),
                    Err(e) => error!("Failed to notify completion listener: {}", e),
                }
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Completion notifier lagged, {} notifications dropped", missed);
            }
            Err(RecvError::Closed) => {
                debug!("Completion channel closed, stopping notifier");
                return;
            }
        }
    }
}
