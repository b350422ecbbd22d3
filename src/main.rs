//! Interval Timer - A drift-free interval countdown timer for the terminal
//!
//! This is the main entry point for the interval-timer application.

use std::sync::Arc;
use tracing::{info, warn};

use interval_timer::{
    config::Config,
    console::{commands::OutputFormat, input_task, render::print_message, render_task},
    services::Alarm,
    state::{AppState, SystemClock},
    tasks::{completion_notifier_task, foreground_resume_task, ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they never tear the countdown line on stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("interval_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let settings = config.settings().map_err(anyhow::Error::msg)?;
    let format = config.output_format();
    let alarm = Arc::new(Alarm::new(config.alarm()));

    info!("Starting interval-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}, tick={}ms", settings.describe(), config.tick_ms);

    // Create application state
    let state = Arc::new(AppState::new(settings, Arc::new(SystemClock::new())));

    // Completion alarm; subscribe before any command can complete an interval
    let listener_alarm = Arc::clone(&alarm);
    state
        .register_completion_listener(move || {
            if let Err(e) = listener_alarm.play() {
                warn!("Failed to play alarm: {}", e);
            }
        })
        .map_err(anyhow::Error::msg)?;
    let completions = state.completion_tx.subscribe();
    tokio::spawn(completion_notifier_task(Arc::clone(&state), completions));

    // Scheduling collaborators
    tokio::spawn(ticker_task(Arc::clone(&state), config.tick_interval()));
    tokio::spawn(foreground_resume_task(Arc::clone(&state)));

    // Presentation
    tokio::spawn(render_task(Arc::clone(&state), format));

    if format == OutputFormat::Text {
        print_message(&format!("{} (type 'help' for commands)", settings.describe()));
    }
    if config.autostart {
        state.start().map_err(anyhow::Error::msg)?;
    }

    tokio::select! {
        _ = input_task(Arc::clone(&state), format, alarm) => {}
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if format == OutputFormat::Text {
        print_message("");
    }
    info!("Interval timer stopped");
    Ok(())
}
