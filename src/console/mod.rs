//! Terminal presentation module
//!
//! Reads commands from stdin and renders the timer to stdout. The console
//! only reads timer state and issues commands; it never touches the engine
//! directly.

pub mod commands;
pub mod render;
pub mod snapshot;

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use crate::{services::Alarm, state::AppState};
use commands::{handle_line, OutputFormat, Reply};
use render::{print_message, print_status_line, Renderer};
use snapshot::StatusSnapshot;

pub use commands::Command;

/// Read and execute commands from stdin until `quit`.
///
/// If stdin reaches end of input the task keeps the timer alive and only
/// a shutdown signal ends the program.
pub async fn input_task(state: Arc<AppState>, format: OutputFormat, alarm: Arc<Alarm>) {
    info!("Reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                debug!("Console input: {:?}", line);
                match handle_line(&state, &line, format, &alarm) {
                    Reply::Message(message) => match format {
                        OutputFormat::Json => println!("{}", message),
                        OutputFormat::Text => {
                            print_message(&message);
                            // The reply scrolled the status line away; draw it again
                            if let Ok(timer) = state.get_timer_state() {
                                print_status_line(&render::status_line(&timer));
                            }
                        }
                    },
                    Reply::Quit => {
                        info!("Quit requested");
                        break;
                    }
                }
            }
            Ok(None) => {
                info!("Stdin closed, console input disabled");
                futures::future::pending::<()>().await;
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
}

/// Render every committed timer state until the state channel closes
pub async fn render_task(state: Arc<AppState>, format: OutputFormat) {
    let mut updates = state.subscribe();
    let mut renderer = Renderer::new();

    loop {
        let timer = updates.borrow_and_update().clone();
        let frame = renderer.frame(&timer);

        match format {
            OutputFormat::Text => {
                for notice in &frame.notices {
                    print_message(notice);
                }
                if let Some(line) = &frame.status {
                    print_status_line(line);
                }
            }
            OutputFormat::Json => {
                // One line per visible change, not per tick
                if frame.status.is_some() || !frame.notices.is_empty() {
                    match state.get_settings() {
                        Ok(settings) => {
                            let snapshot = StatusSnapshot::new(timer, settings, &state);
                            println!("{}", snapshot.to_json());
                        }
                        Err(e) => error!("Failed to read settings for snapshot: {}", e),
                    }
                }
            }
        }

        if updates.changed().await.is_err() {
            debug!("Timer state channel closed, stopping renderer");
            return;
        }
    }
}
