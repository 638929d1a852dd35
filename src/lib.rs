//! Strictly Clock library - turn, phase and time tracking for tabletop games
//!
//! A message-driven terminal app: every input becomes a [`Message`], a pure
//! [`UpdateEngine`] maps the current [`GameState`] and the message to the
//! next state plus an optional [`Command`], and the result is rendered.
//!
//! # Architecture
//!
//! - **Game**: state, messages, commands and the update engine
//! - **Runtime**: message bus, consumer loop, one-second scheduler, shutdown
//! - **Trail**: asynchronous drop-on-full CSV action log
//! - **Options**: rulesets, palettes and the JSON options store
//! - **TUI**: ratatui view and crossterm input capture
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_clock::{AsyncLogger, CsvTrail, GameState, Message, Options, UpdateEngine};
//!
//! let trail = Arc::new(AsyncLogger::new(CsvTrail::from_env()));
//! let engine = UpdateEngine::new(Arc::clone(&trail));
//! let state = GameState::new(Options::default());
//! let (state, _command) = engine.update(&state, Some(Message::StartGame));
//! assert!(*state.game_started());
//! trail.cleanup();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod game;
mod options;
mod palette;
mod rules;
mod runtime;
mod trail;
mod tui;

// Crate-level exports - CLI
pub use cli::Cli;

// Crate-level exports - Game core
pub use game::{
    Command, GameState, GameStatus, LOG_DATE_TIME_FORMAT, LogEntry, MAX_NAME_CHARS, MAX_PLAYERS,
    Message, Modal, OptionField, Player, Screen, UpdateEngine,
};

// Crate-level exports - Options and rules
pub use options::{
    DEFAULT_OPTIONS_FILE, DEFAULT_PALETTE, DEFAULT_PLAYER_COUNT, Options, OptionsError,
    OptionsStore, TimeFormat, default_player_names,
};
pub use palette::{ColorTable, Palette};
pub use rules::{Ruleset, builtin_rulesets};

// Crate-level exports - Runtime
pub use runtime::{
    BusClosed, BusSender, ClockFace, CommandExecutor, ConsumerLoop, MessageBus, Renderer,
    Scheduler, ShutdownListener, ShutdownSignal, TICK_PERIOD, WallClock,
};

// Crate-level exports - Trail
pub use trail::{
    AsyncLogger, CsvTrail, LOG_DIR_ENV, LOG_FILE_NAME, Submission, TRAIL_CAPACITY, TRAIL_HEADER,
    TrailError, TrailSink,
};

// Crate-level exports - Terminal UI
pub use tui::{
    POLL_INTERVAL, TerminalView, draw, format_duration, is_quit_key, run_tui, spawn_input_capture,
    start_label,
};
