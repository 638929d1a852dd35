//! Messages consumed by the update engine.

use crossterm::event::KeyCode;

use crate::game::types::Modal;
use crate::options::TimeFormat;

/// Every input the update engine understands.
///
/// Messages arrive from the input actor, the scheduler, and from
/// commands returned by earlier updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Start, pause, or resume the game.
    StartGame,
    /// Reset the game to its initial state.
    EndGame,
    /// Ask for confirmation before ending the game.
    ShowEndGameConfirm,
    /// Answer to the end-game confirmation.
    EndGameConfirm {
        /// Whether the user confirmed.
        confirmed: bool,
    },
    /// Hand the turn to the next seat.
    SwitchTurns,
    /// Advance the active player's phase.
    NextPhase,
    /// Step the active player's phase back.
    PrevPhase,
    /// Toggle the options screen.
    ShowOptions,
    /// Toggle the about screen.
    ShowAbout,
    /// Return to the main screen.
    ShowMainScreen,
    /// Close any modal after returning to the main screen.
    RestoreMainUi,
    /// Open a modal.
    ShowModal(Modal),
    /// One second of wall time has passed.
    Tick,
    /// A key was pressed.
    KeyPress(KeyCode),
    /// Select a ruleset by index.
    SetRuleset {
        /// Index into the options rule table.
        index: usize,
    },
    /// Change the number of players.
    SetPlayerCount {
        /// New count, must be positive.
        count: usize,
    },
    /// Rename a seat.
    SetPlayerName {
        /// Seat index.
        index: usize,
        /// New name.
        name: String,
    },
    /// Select a colour palette by name.
    SetColorPalette {
        /// Palette name.
        name: String,
    },
    /// Select the clock format.
    SetTimeFormat {
        /// New format.
        format: TimeFormat,
    },
    /// Toggle the active ruleset's shared-turn flag.
    SetOneTurnForAllPlayers {
        /// New flag value.
        value: bool,
    },
    /// Turn the CSV trail on or off.
    SetLoggingEnabled {
        /// New flag value.
        value: bool,
    },
}
