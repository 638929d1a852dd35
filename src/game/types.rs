//! Core domain types for the turn tracker.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use strum::Display;
use tracing::{debug, instrument};

use crate::options::Options;
use crate::palette::Palette;

/// CSV and on-screen format for log timestamps.
pub const LOG_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum GameStatus {
    /// No game has been started since launch or the last reset.
    #[default]
    #[strum(serialize = "Game Not Started")]
    NotStarted,
    /// Clocks are running.
    #[strum(serialize = "Game In Progress")]
    InProgress,
    /// Clocks are stopped until the game is resumed.
    #[strum(serialize = "Game Paused")]
    Paused,
}

/// Top-level screen shown by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Screen {
    /// Player panels.
    #[default]
    Main,
    /// Options editor.
    Options,
    /// About panel.
    About,
}

/// Modal dialog drawn over the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Modal {
    /// Asks the user to confirm ending the game.
    EndGameConfirm,
}

/// Rows of the options screen, in display order.
///
/// One `PlayerName` row is shown per seat, right after the player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionField {
    /// Selected ruleset.
    #[default]
    Ruleset,
    /// Number of players.
    PlayerCount,
    /// Name of the player in this seat.
    PlayerName(usize),
    /// Colour palette.
    ColorPalette,
    /// Clock format.
    TimeFormat,
    /// Shared turn for all players.
    OneTurnForAllPlayers,
    /// CSV trail on or off.
    LoggingEnabled,
}

impl OptionField {
    /// Every row shown for `player_count` seats.
    pub fn rows(player_count: usize) -> Vec<Self> {
        let mut rows = vec![Self::Ruleset, Self::PlayerCount];
        rows.extend((0..player_count).map(Self::PlayerName));
        rows.extend([
            Self::ColorPalette,
            Self::TimeFormat,
            Self::OneTurnForAllPlayers,
            Self::LoggingEnabled,
        ]);
        rows
    }

    /// Returns the display label for this row.
    pub fn label(self) -> String {
        match self {
            Self::Ruleset => "Rules".to_string(),
            Self::PlayerCount => "Players".to_string(),
            Self::PlayerName(seat) => format!("Player {} name", seat + 1),
            Self::ColorPalette => "Color palette".to_string(),
            Self::TimeFormat => "Time format".to_string(),
            Self::OneTurnForAllPlayers => "One turn for all players".to_string(),
            Self::LoggingEnabled => "Enable CSV logging".to_string(),
        }
    }

    /// Moves to the next row, wrapping around.
    pub fn next(self, player_count: usize) -> Self {
        let rows = Self::rows(player_count);
        let idx = rows.iter().position(|f| *f == self).unwrap_or(0);
        rows[(idx + 1) % rows.len()]
    }

    /// Moves to the previous row, wrapping around.
    pub fn previous(self, player_count: usize) -> Self {
        let rows = Self::rows(player_count);
        let idx = rows.iter().position(|f| *f == self).unwrap_or(0);
        rows[(idx + rows.len() - 1) % rows.len()]
    }
}

/// One row of a player's action log and of the CSV trail.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct LogEntry {
    /// Local time the action happened.
    date_time: NaiveDateTime,
    /// Player the action belongs to.
    player_name: String,
    /// Player's turn count at the time.
    turn: u32,
    /// Player's phase name at the time, empty if the ruleset has none.
    phase: String,
    /// What happened.
    message: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current local time.
    pub fn stamped(
        player_name: impl Into<String>,
        turn: u32,
        phase: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            Local::now().naive_local(),
            player_name.into(),
            turn,
            phase.into(),
            message.into(),
        )
    }

    /// Formats the timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub fn formatted_date_time(&self) -> String {
        self.date_time.format(LOG_DATE_TIME_FORMAT).to_string()
    }
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Player {
    pub(crate) name: String,
    pub(crate) time_elapsed: Duration,
    pub(crate) is_turn: bool,
    pub(crate) current_phase: usize,
    pub(crate) turn_count: u32,
    pub(crate) action_log: Vec<LogEntry>,
}

impl Player {
    /// Creates an idle player with zeroed clocks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time_elapsed: Duration::ZERO,
            is_turn: false,
            current_phase: 0,
            turn_count: 0,
            action_log: Vec::new(),
        }
    }

    /// Returns the name of the player's current phase.
    pub fn phase_name<'a>(&self, phases: &'a [String]) -> Option<&'a str> {
        phases.get(self.current_phase).map(String::as_str)
    }

    /// Appends an entry to the on-screen action log.
    pub(crate) fn note(&mut self, phases: &[String], message: impl Into<String>) -> LogEntry {
        let entry = LogEntry::stamped(
            self.name.clone(),
            self.turn_count,
            self.phase_name(phases).unwrap_or_default(),
            message,
        );
        self.action_log.push(entry.clone());
        entry
    }
}

/// The authoritative session snapshot.
///
/// Created once from [`Options`] and afterwards only replaced by the
/// message loop with the value returned from
/// [`UpdateEngine::update`](crate::UpdateEngine::update).
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameState {
    pub(crate) players: Vec<Player>,
    pub(crate) phases: Vec<String>,
    pub(crate) status: GameStatus,
    pub(crate) screen: Screen,
    pub(crate) modal: Option<Modal>,
    pub(crate) game_started: bool,
    pub(crate) total_game_time: Duration,
    pub(crate) options: Options,
    pub(crate) palette: Palette,
    pub(crate) options_cursor: OptionField,
    /// Text being typed into a player name row, if editing.
    pub(crate) name_draft: Option<String>,
}

impl GameState {
    /// Builds the initial state for a set of options.
    ///
    /// Options are normalized first. Player 0 holds the turn and every
    /// player's log starts with an initialization entry.
    #[instrument(skip(options))]
    pub fn new(options: Options) -> Self {
        let options = options.normalized();
        let phases = options
            .active_ruleset()
            .map(|rule| rule.phases().clone())
            .unwrap_or_default();
        let players = seat_players(&options, &phases);
        let palette = Palette::from_name(options.color_palette());
        debug!(
            players = players.len(),
            phases = phases.len(),
            palette = %palette,
            "Created game state"
        );
        Self {
            players,
            phases,
            status: GameStatus::NotStarted,
            screen: Screen::Main,
            modal: None,
            game_started: false,
            total_game_time: Duration::ZERO,
            options,
            palette,
            options_cursor: OptionField::default(),
            name_draft: None,
        }
    }

    /// Index of the player holding the turn.
    pub fn active_player_index(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_turn)
    }

    /// The player holding the turn.
    pub fn active_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_turn)
    }

    /// Whether the active ruleset ignores phases.
    pub fn one_turn_for_all_players(&self) -> bool {
        self.options
            .active_ruleset()
            .is_some_and(|rule| *rule.one_turn_for_all_players())
    }

    /// Name of the active ruleset.
    pub fn ruleset_name(&self) -> &str {
        self.options
            .active_ruleset()
            .map(|rule| rule.name().as_str())
            .unwrap_or_default()
    }
}

/// Builds a fresh roster from the options, seat 0 holding the turn.
#[instrument(skip_all)]
pub(crate) fn seat_players(options: &Options, phases: &[String]) -> Vec<Player> {
    (0..*options.player_count())
        .map(|seat| {
            let mut player = Player::new(options.player_name(seat));
            player.is_turn = seat == 0;
            if seat == 0 {
                player.note(phases, "Initialized - active player");
            } else {
                player.note(phases, "Initialized");
            }
            player
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_seats_player_zero() {
        let state = GameState::new(Options::default());
        assert_eq!(state.players().len(), 2);
        assert_eq!(state.active_player_index(), Some(0));
        assert_eq!(*state.status(), GameStatus::NotStarted);
        assert!(!state.game_started());
    }

    #[test]
    fn test_new_state_logs_initialization() {
        let state = GameState::new(Options::default());
        let first = &state.players()[0].action_log()[0];
        let second = &state.players()[1].action_log()[0];
        assert_eq!(first.message(), "Initialized - active player");
        assert_eq!(second.message(), "Initialized");
        assert_eq!(first.phase(), "Command Phase");
    }

    #[test]
    fn test_option_field_cycles() {
        assert_eq!(OptionField::LoggingEnabled.next(2), OptionField::Ruleset);
        assert_eq!(OptionField::Ruleset.previous(2), OptionField::LoggingEnabled);
    }

    #[test]
    fn test_option_rows_include_one_name_per_seat() {
        let rows = OptionField::rows(3);
        assert_eq!(rows.len(), 9);
        assert_eq!(OptionField::PlayerCount.next(3), OptionField::PlayerName(0));
        assert_eq!(OptionField::PlayerName(2).next(3), OptionField::ColorPalette);
        assert_eq!(OptionField::ColorPalette.previous(1), OptionField::PlayerName(0));
        assert_eq!(OptionField::PlayerName(1).label(), "Player 2 name");
    }

    #[test]
    fn test_status_display_text() {
        assert_eq!(GameStatus::InProgress.to_string(), "Game In Progress");
        assert_eq!(Screen::Options.to_string(), "options");
    }
}
