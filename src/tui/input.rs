//! Keyboard capture actor.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::game::Message;
use crate::runtime::{BusSender, ShutdownSignal};

/// How long each poll waits for a terminal event.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Whether `key` asks to quit: `q`, `Q` or Ctrl-C.
///
/// While `typing` a player name only Ctrl-C quits.
pub fn is_quit_key(key: &KeyEvent, typing: bool) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => !typing,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Spawns the blocking task that turns key presses into messages.
///
/// Quit keys trigger `shutdown` instead of reaching the bus. `typing` is
/// the flag the view publishes while a name is being edited. The task ends
/// when shutdown fires or the bus closes.
pub fn spawn_input_capture(
    bus: BusSender,
    shutdown: ShutdownSignal,
    typing: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || capture(bus, shutdown, typing))
}

#[instrument(skip_all)]
fn capture(bus: BusSender, shutdown: ShutdownSignal, typing: watch::Receiver<bool>) {
    info!("Input capture started");
    while !shutdown.is_triggered() {
        let ready = match event::poll(POLL_INTERVAL) {
            Ok(ready) => ready,
            Err(e) => {
                warn!(error = %e, "Failed to poll terminal events, shutting down");
                shutdown.trigger();
                break;
            }
        };
        if !ready {
            continue;
        }

        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "Failed to read terminal event");
                continue;
            }
        };
        // Crossterm reports both press and release on some platforms.
        if key.kind == KeyEventKind::Release {
            continue;
        }
        if is_quit_key(&key, *typing.borrow()) {
            debug!("Quit key pressed");
            shutdown.trigger();
            break;
        }
        if bus.post(Message::KeyPress(key.code)).is_err() {
            debug!("Bus closed, input capture stopping");
            break;
        }
    }
    info!("Input capture stopped");
}
