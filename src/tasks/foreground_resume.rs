//! Foreground-resume recovery task

use std::sync::Arc;
use futures::stream::StreamExt;
use signal_hook::consts::SIGCONT;
use signal_hook_tokio::Signals;
use tracing::{error, info, warn};

use crate::state::AppState;

/// Background task that re-evaluates the timer when the process is
/// continued after being stopped (job control, `kill -STOP`/`-CONT`).
///
/// While stopped no ticks run at all, so the displayed countdown is stale
/// until this catches it up.
pub async fn foreground_resume_task(state: Arc<AppState>) {
    info!("Starting foreground resume task");

    let mut signals = match Signals::new([SIGCONT]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to register SIGCONT handler: {}", e);
            return;
        }
    };

    while let Some(signal) = signals.next().await {
        info!("Process resumed (signal {}), reconciling timer", signal);

        if let Err(e) = state.on_foreground() {
            warn!("Failed to reconcile timer after resume: {}", e);
        }
    }
}
