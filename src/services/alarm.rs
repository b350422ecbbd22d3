//! Completion alarm: terminal bell plus an optional external player command

use std::{io::Write, process::Stdio, sync::Mutex};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// How the user is alerted when an interval completes
#[derive(Debug, Clone, Default)]
pub struct AlarmConfig {
    /// Shell command run on completion, e.g. `paplay ~/alarm.wav`
    pub command: Option<String>,
    pub bell: bool,
}

impl AlarmConfig {
    pub fn new(command: Option<String>, bell: bool) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
            bell,
        }
    }
}

/// Ring the terminal bell
pub fn ring_bell() {
    let mut stdout = std::io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
        debug!("Failed to ring terminal bell: {}", e);
    }
}

/// Plays the completion alarm.
///
/// At most one external player runs at a time: playing again stops the
/// previous player first, and [`Alarm::stop`] silences it.
#[derive(Debug, Default)]
pub struct Alarm {
    config: AlarmConfig,
    player: Mutex<Option<Child>>,
}

impl Alarm {
    pub fn new(config: AlarmConfig) -> Self {
        Self {
            config,
            player: Mutex::new(None),
        }
    }

    /// Ring the bell and (re)start the alarm command.
    ///
    /// Must be called from within a tokio runtime when a command is set.
    pub fn play(&self) -> Result<(), String> {
        if self.config.bell {
            ring_bell();
        }

        let Some(command) = &self.config.command else {
            return Ok(());
        };

        let mut player = self.player.lock()
            .map_err(|e| format!("Failed to lock alarm player: {}", e))?;
        if let Some(mut previous) = player.take() {
            stop_player(&mut previous);
        }

        *player = Some(spawn_alarm_command(command)?);
        info!("Alarm playing");
        Ok(())
    }

    /// Silence the running alarm. Returns `false` if nothing was playing.
    pub fn stop(&self) -> Result<bool, String> {
        let mut player = self.player.lock()
            .map_err(|e| format!("Failed to lock alarm player: {}", e))?;

        Ok(match player.take() {
            Some(mut child) => stop_player(&mut child),
            None => false,
        })
    }

    pub fn is_playing(&self) -> Result<bool, String> {
        let mut player = self.player.lock()
            .map_err(|e| format!("Failed to lock alarm player: {}", e))?;

        Ok(match player.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        })
    }
}

/// Start the alarm command through the shell without waiting for it
pub fn spawn_alarm_command(command: &str) -> Result<Child, String> {
    debug!("Running alarm command: {}", command);

    Command::new("sh")
        .args(["-c", command])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("Failed to execute alarm command: {}", e))
}

/// Kill a player unless it already exited. Returns whether it was still running.
fn stop_player(child: &mut Child) -> bool {
    match child.try_wait() {
        Ok(Some(status)) => {
            if !status.success() {
                warn!("Alarm command exited with {}", status);
            }
            false
        }
        Ok(None) => match child.start_kill() {
            Ok(()) => {
                info!("Alarm stopped");
                true
            }
            Err(e) => {
                warn!("Failed to stop alarm command: {}", e);
                false
            }
        },
        Err(e) => {
            warn!("Failed to check alarm command: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};
    use tokio::time::{sleep, timeout};

    use super::*;

    #[test]
    fn blank_command_is_ignored() {
        assert!(AlarmConfig::new(Some("   ".to_string()), true).command.is_none());
        assert_eq!(
            AlarmConfig::new(Some("true".to_string()), false).command.as_deref(),
            Some("true")
        );
    }

    fn shell_quote(path: &Path) -> String {
        format!("'{}'", path.display())
    }

    async fn wait_for_count(log: &Path, word: &str, expected: usize) {
        timeout(Duration::from_secs(3), async {
            loop {
                let contents = std::fs::read_to_string(log).unwrap_or_default();
                if contents.lines().filter(|l| *l == word).count() >= expected {
                    break;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("alarm command did not write in time");
    }

    fn count(log: &Path, word: &str) -> usize {
        std::fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .filter(|l| *l == word)
            .count()
    }

    fn slow_alarm(log: &Path) -> Alarm {
        let log = shell_quote(log);
        let command = format!("echo start >> {0}; sleep 1; echo end >> {0}", log);
        Alarm::new(AlarmConfig::new(Some(command), false))
    }

    #[tokio::test]
    async fn playing_again_replaces_running_player() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("alarm.log");
        let alarm = slow_alarm(&log);

        alarm.play().unwrap();
        wait_for_count(&log, "start", 1).await;
        alarm.play().unwrap();
        wait_for_count(&log, "start", 2).await;
        assert!(alarm.is_playing().unwrap());

        // Only the second player lives long enough to finish
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(count(&log, "end"), 1);
        assert!(!alarm.is_playing().unwrap());
    }

    #[tokio::test]
    async fn stop_silences_player() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("alarm.log");
        let alarm = slow_alarm(&log);

        assert!(!alarm.stop().unwrap());
        alarm.play().unwrap();
        wait_for_count(&log, "start", 1).await;
        assert!(alarm.stop().unwrap());
        assert!(!alarm.is_playing().unwrap());

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(count(&log, "end"), 0);
        assert!(!alarm.stop().unwrap());
    }

    #[tokio::test]
    async fn bell_only_alarm_has_no_player() {
        let alarm = Alarm::new(AlarmConfig::new(None, false));
        alarm.play().unwrap();
        assert!(!alarm.is_playing().unwrap());
        assert!(!alarm.stop().unwrap());
    }
}
