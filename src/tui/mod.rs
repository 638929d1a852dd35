//! Terminal front end.

mod input;
mod view;

pub use input::{POLL_INTERVAL, is_quit_key, spawn_input_capture};
pub use view::{TerminalView, draw, format_duration, start_label};

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::game::{GameState, UpdateEngine};
use crate::options::OptionsStore;
use crate::runtime::{ConsumerLoop, MessageBus, Scheduler, ShutdownSignal, WallClock};
use crate::trail::{AsyncLogger, CsvTrail};

/// Runs an interactive session until the user quits.
///
/// Loads options from `options_path`, starts the trail logger, and drives
/// the message loop on the terminal. The terminal is restored and the
/// trail flushed before returning.
#[instrument(skip_all, fields(options = %options_path.display()))]
pub async fn run_tui(options_path: &Path) -> Result<()> {
    let store = OptionsStore::new(options_path);
    let options = store.load();

    let trail = Arc::new(AsyncLogger::new(CsvTrail::from_env()));
    trail.initialise();
    let engine = UpdateEngine::new(Arc::clone(&trail));
    let state = GameState::new(options);
    engine.seed_trail(&state);

    let result = match enter_terminal() {
        Ok(guard) => {
            let result = run_session(engine, state, store).await;
            drop(guard);
            result
        }
        Err(e) => Err(e),
    };

    // Blocks until every queued entry is on disk.
    let drain = Arc::clone(&trail);
    if let Err(e) = tokio::task::spawn_blocking(move || drain.cleanup()).await {
        warn!(error = %e, "Trail cleanup task failed");
    }

    match result {
        Ok(state) => {
            info!(
                total = %format_duration(*state.total_game_time()),
                dropped = trail.dropped(),
                "Session ended"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "Session failed");
            Err(e)
        }
    }
}

/// Runs its restore action when dropped.
struct TerminalGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Enters raw mode and the alternate screen.
fn enter_terminal() -> Result<TerminalGuard<fn()>> {
    prepare_terminal(
        enable_raw_mode,
        || execute!(io::stdout(), EnterAlternateScreen),
        restore_terminal as fn(),
    )
}

/// Runs both setup steps, restoring through `restore` if the second fails.
fn prepare_terminal<F: FnMut()>(
    raw_mode: impl FnOnce() -> io::Result<()>,
    alternate_screen: impl FnOnce() -> io::Result<()>,
    restore: F,
) -> Result<TerminalGuard<F>> {
    raw_mode()?;
    let guard = TerminalGuard { restore };
    alternate_screen()?;
    debug!("Terminal prepared");
    Ok(guard)
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "Failed to disable raw mode");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
        warn!(error = %e, "Failed to leave alternate screen");
    }
}

async fn run_session(
    engine: UpdateEngine,
    state: GameState,
    store: OptionsStore,
) -> Result<GameState> {
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let bus = MessageBus::new();
    let shutdown = ShutdownSignal::new();

    let (clock, clock_rx) = WallClock::channel();
    let scheduler = Scheduler::new(bus.sender(), clock).spawn(shutdown.listener());
    let (typing_tx, typing_rx) = watch::channel(false);
    let input = spawn_input_capture(bus.sender(), shutdown.clone(), typing_rx);

    let view = TerminalView::new(terminal, clock_rx).with_typing(typing_tx);
    let mut consumer = ConsumerLoop::new(engine, view).with_store(store);
    let state = consumer.run(bus, state, shutdown.listener()).await;

    shutdown.trigger();
    if let Err(e) = scheduler.await {
        warn!(error = %e, "Scheduler task failed");
    }
    if let Err(e) = input.await {
        warn!(error = %e, "Input task failed");
    }
    Ok(state)
}
