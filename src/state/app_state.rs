//! Main application state management

use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{Clock, IntervalCompleted, IntervalTimer, Settings, TimerState};

/// Callback fired once per completed interval
pub type CompletionListener = Arc<dyn Fn() + Send + Sync>;

/// Shared application state: the timer engine plus its collaborators
pub struct AppState {
    /// The engine; only mutated through the command methods below
    timer: Mutex<IntervalTimer>,
    clock: Arc<dyn Clock>,
    /// At most one listener; registering replaces the previous one
    listener: Mutex<Option<CompletionListener>>,
    pub start_time: Instant,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Completion events waiting for the notifier task
    pub completion_tx: broadcast::Sender<IntervalCompleted>,
    /// Every committed timer state
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerState>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("timer", &self.timer)
            .field("clock", &self.clock)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new AppState with an idle timer
    pub fn new(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let timer = IntervalTimer::new(settings);
        let (completion_tx, _) = broadcast::channel(100);
        let (timer_update_tx, timer_update_rx) = watch::channel(timer.state().clone());

        Self {
            timer: Mutex::new(timer),
            clock,
            listener: Mutex::new(None),
            start_time: Instant::now(),
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            completion_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Apply a transition to the engine, publish the result and queue
    /// any completion events it produced.
    ///
    /// Events are only sent after the lock is released, so listeners
    /// always observe the committed state.
    fn update_timer<F>(&self, action: Option<&str>, transition: F) -> Result<TimerState, String>
    where
        F: FnOnce(&mut IntervalTimer, u64) -> Vec<IntervalCompleted>,
    {
        let now = self.clock.now();

        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;
        let completions = transition(&mut *timer, now);
        let new_state = timer.state().clone();
        drop(timer); // Release the lock early

        if let Some(action) = action {
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action.to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        // send_replace never fails, even with no receivers left
        self.timer_update_tx.send_replace(new_state.clone());

        for completion in completions {
            info!(
                "Interval {} of {} completed",
                completion.interval, new_state.total_intervals
            );
            if let Err(e) = self.completion_tx.send(completion) {
                warn!("Failed to queue completion notification: {}", e);
            }
        }

        Ok(new_state)
    }

    /// Start or resume the timer
    pub fn start(&self) -> Result<TimerState, String> {
        self.update_timer(Some("start"), |timer, now| {
            if timer.start(now) {
                info!("Timer started at interval {}", timer.state().current_interval);
            } else {
                info!("Start ignored: timer already running or session complete");
            }
            Vec::new()
        })
    }

    /// Pause the timer, settling the remaining time at the pause instant
    pub fn pause(&self) -> Result<TimerState, String> {
        self.update_timer(Some("pause"), |timer, now| {
            let completions = timer.tick(now);
            if timer.pause(now) {
                info!("Timer paused with {}ms remaining", timer.state().time_remaining_ms);
            }
            completions
        })
    }

    /// Pause if running, otherwise start
    pub fn toggle(&self) -> Result<TimerState, String> {
        if self.get_timer_state()?.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Discard the session and return to the first interval
    pub fn reset(&self) -> Result<TimerState, String> {
        self.update_timer(Some("reset"), |timer, _| {
            info!("Resetting timer");
            timer.reset();
            Vec::new()
        })
    }

    /// Replace the settings; always performs a full reset
    pub fn reconfigure(&self, settings: Settings) -> Result<TimerState, String> {
        self.update_timer(Some("reconfigure"), |timer, _| {
            info!("Reconfiguring timer: {}", settings.describe());
            timer.reconfigure(settings);
            Vec::new()
        })
    }

    /// Periodic re-evaluation against the clock
    pub fn tick(&self) -> Result<TimerState, String> {
        self.update_timer(None, |timer, now| timer.tick(now))
    }

    /// Host came back to the foreground; reconcile any tick gap immediately
    pub fn on_foreground(&self) -> Result<(), String> {
        if self.get_timer_state()?.is_running {
            info!("Foreground resume, re-evaluating timer");
            self.tick()?;
        }
        Ok(())
    }

    /// Register the completion listener, replacing any previous one
    pub fn register_completion_listener<F>(&self, listener: F) -> Result<(), String>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut slot = self.listener.lock()
            .map_err(|e| format!("Failed to lock completion listener: {}", e))?;
        if slot.replace(Arc::new(listener)).is_some() {
            info!("Replaced completion listener");
        }
        Ok(())
    }

    /// Invoke the registered listener, if any.
    ///
    /// The listener is cloned out of its slot first so it runs without
    /// holding any lock and may itself re-register or issue commands.
    /// A panicking listener is reported as an error and stays registered.
    pub fn notify_completion(&self) -> Result<bool, String> {
        let listener = self.listener.lock()
            .map_err(|e| format!("Failed to lock completion listener: {}", e))?
            .clone();

        let Some(listener) = listener else {
            return Ok(false);
        };

        catch_unwind(AssertUnwindSafe(|| listener()))
            .map(|_| true)
            .map_err(|panic| {
                let reason = panic.downcast_ref::<&str>().map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown cause".to_string());
                format!("Completion listener panicked: {}", reason)
            })
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.timer.lock()
            .map(|timer| timer.state().clone())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Get current settings
    pub fn get_settings(&self) -> Result<Settings, String> {
        self.timer.lock()
            .map(|timer| timer.settings())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Watch committed timer states
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.timer_update_tx.subscribe()
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::state::ManualClock;

    fn one_minute_state(intervals: u32) -> (AppState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let state = AppState::new(Settings::new(1, intervals).unwrap(), clock.clone());
        (state, clock)
    }

    #[test]
    fn commands_publish_state() {
        let (state, clock) = one_minute_state(2);
        let rx = state.subscribe();

        state.start().unwrap();
        assert!(rx.borrow().is_running);

        clock.advance(15_000);
        state.tick().unwrap();
        assert_eq!(rx.borrow().time_remaining_ms, 45_000);

        state.pause().unwrap();
        assert!(!rx.borrow().is_running);
        assert_eq!(state.get_last_action().0.as_deref(), Some("pause"));
    }

    #[test]
    fn pause_settles_remaining_time() {
        let (state, clock) = one_minute_state(1);
        state.start().unwrap();
        clock.advance(20_000);
        let paused = state.pause().unwrap();
        assert_eq!(paused.time_remaining_ms, 40_000);
    }

    #[test]
    fn toggle_alternates() {
        let (state, _clock) = one_minute_state(1);
        assert!(state.toggle().unwrap().is_running);
        assert!(!state.toggle().unwrap().is_running);
    }

    #[test]
    fn completions_are_queued_not_invoked() {
        let (state, clock) = one_minute_state(2);
        let mut rx = state.completion_tx.subscribe();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        state.register_completion_listener(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }).unwrap();

        state.start().unwrap();
        clock.advance(125_000);
        state.tick().unwrap();

        // the tick itself never calls the listener
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(rx.try_recv().unwrap().interval, 1);
        let last = rx.try_recv().unwrap();
        assert_eq!(last.interval, 2);
        assert!(last.session_complete);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn registering_replaces_listener() {
        let (state, _clock) = one_minute_state(1);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        state.register_completion_listener(move || {
            f.fetch_add(1, Ordering::SeqCst);
        }).unwrap();
        let s = second.clone();
        state.register_completion_listener(move || {
            s.fetch_add(1, Ordering::SeqCst);
        }).unwrap();

        assert!(state.notify_completion().unwrap());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_listener_is_reported_and_kept() {
        let (state, _clock) = one_minute_state(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        state.register_completion_listener(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("speaker unplugged");
            }
        }).unwrap();

        let err = state.notify_completion().unwrap_err();
        assert!(err.contains("speaker unplugged"));
        assert!(state.notify_completion().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn notify_without_listener_reports_false() {
        let (state, _clock) = one_minute_state(1);
        assert!(!state.notify_completion().unwrap());
    }

    #[test]
    fn foreground_only_ticks_when_running() {
        let (state, clock) = one_minute_state(1);
        clock.advance(30_000);
        state.on_foreground().unwrap();
        assert_eq!(state.get_timer_state().unwrap().time_remaining_ms, 60_000);

        state.start().unwrap();
        clock.advance(30_000);
        state.on_foreground().unwrap();
        assert_eq!(state.get_timer_state().unwrap().time_remaining_ms, 30_000);
    }

    #[test]
    fn reconfigure_resets_under_new_settings() {
        let (state, clock) = one_minute_state(3);
        state.start().unwrap();
        clock.advance(90_000);
        state.tick().unwrap();

        let settings = Settings::new(5, 2).unwrap();
        let fresh = state.reconfigure(settings).unwrap();
        assert_eq!(fresh, TimerState::new(&settings));
        assert_eq!(state.get_settings().unwrap(), settings);
    }

    #[test]
    fn uptime_is_formatted() {
        let (state, _clock) = one_minute_state(1);
        assert!(state.get_uptime().ends_with('s'));
    }
}
