//! Periodic re-evaluation of the running timer

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Nominal cadence of timer re-evaluation
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Background task that ticks the timer while it is running.
///
/// Idles on the state watch channel while the timer is stopped and starts
/// a fresh interval each time it is started again. The cadence only
/// affects display smoothness; elapsed time comes from the clock.
pub async fn ticker_task(state: Arc<AppState>, cadence: Duration) {
    info!("Starting ticker task ({}ms cadence)", cadence.as_millis());

    let mut updates = state.subscribe();

    loop {
        // Wait until the timer is running
        if !updates.borrow_and_update().is_running {
            if updates.changed().await.is_err() {
                debug!("Timer state channel closed, stopping ticker");
                return;
            }
            continue;
        }

        debug!("Timer running, ticking every {}ms", cadence.as_millis());
        let mut ticks = interval(cadence);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if let Err(e) = state.tick() {
                        error!("Failed to tick timer: {}", e);
                    }
                }

                changed = updates.changed() => {
                    if changed.is_err() {
                        debug!("Timer state channel closed, stopping ticker");
                        return;
                    }
                    if !updates.borrow_and_update().is_running {
                        debug!("Timer stopped, ticker idle");
                        break;
                    }
                }
            }
        }
    }
}
