//! The update engine: `(state, message) -> (state, command)`.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyCode;
use tracing::{debug, info, instrument};

use crate::game::command::Command;
use crate::game::message::Message;
use crate::game::types::{
    GameState, GameStatus, Modal, OptionField, Player, Screen, seat_players,
};
use crate::palette::Palette;
use crate::trail::{AsyncLogger, Submission};

/// Highest player count reachable from the options screen.
pub const MAX_PLAYERS: usize = 8;

/// Longest player name accepted from the options screen, in characters.
pub const MAX_NAME_CHARS: usize = 20;

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Computes the next game state for each message.
///
/// The engine never mutates the state it is given. Entries logged by the
/// handlers are appended to the players' action logs and, when logging is
/// enabled, submitted to the trail logger.
#[derive(Debug, Clone)]
pub struct UpdateEngine {
    trail: Arc<AsyncLogger>,
}

impl UpdateEngine {
    /// Creates an engine submitting to `trail`.
    pub fn new(trail: Arc<AsyncLogger>) -> Self {
        Self { trail }
    }

    /// The trail logger handlers submit to.
    pub fn trail(&self) -> &Arc<AsyncLogger> {
        &self.trail
    }

    /// Submits every entry already in the players' action logs.
    ///
    /// Used once at startup for the initialization entries, which are
    /// recorded whether or not logging is enabled. Returns how many entries
    /// were queued.
    #[instrument(skip_all)]
    pub fn seed_trail(&self, state: &GameState) -> usize {
        let queued = state
            .players
            .iter()
            .flat_map(|p| p.action_log.iter().cloned())
            .map(|entry| self.trail.submit(entry))
            .filter(|submission| *submission == Submission::Queued)
            .count();
        info!(queued, "Seeded trail");
        queued
    }

    /// Handles one message.
    ///
    /// Returns the new state and an optional command whose result is fed
    /// back as the next message. `None` returns the state unchanged.
    #[instrument(level = "debug", skip(self, state))]
    pub fn update(
        &self,
        state: &GameState,
        message: Option<Message>,
    ) -> (GameState, Option<Command>) {
        let Some(message) = message else {
            return unchanged(state);
        };

        match message {
            Message::StartGame => (self.start_game(state), None),
            Message::EndGame => (self.end_game(state), None),
            Message::ShowEndGameConfirm => (
                state.clone(),
                Some(Command::message(Message::ShowModal(Modal::EndGameConfirm))),
            ),
            Message::EndGameConfirm { confirmed } => {
                let next = if confirmed {
                    self.end_game(state)
                } else {
                    debug!("End game cancelled");
                    state.clone()
                };
                (next, Some(Command::message(Message::ShowMainScreen)))
            }
            Message::SwitchTurns => (self.switch_turns(state), None),
            Message::NextPhase => (self.shift_phase(state, true), None),
            Message::PrevPhase => (self.shift_phase(state, false), None),
            Message::ShowOptions => (toggle_screen(state, Screen::Options), None),
            Message::ShowAbout => (toggle_screen(state, Screen::About), None),
            Message::ShowMainScreen => {
                let next = GameState {
                    screen: Screen::Main,
                    ..state.clone()
                };
                (next, Some(Command::message(Message::RestoreMainUi)))
            }
            Message::RestoreMainUi => (
                GameState {
                    modal: None,
                    ..state.clone()
                },
                None,
            ),
            Message::ShowModal(modal) => (
                GameState {
                    modal: Some(modal),
                    ..state.clone()
                },
                None,
            ),
            Message::Tick => (tick(state), None),
            Message::KeyPress(code) => self.key_press(state, code),
            Message::SetRuleset { index } => (set_ruleset(state, index), None),
            Message::SetPlayerCount { count } => (set_player_count(state, count), None),
            Message::SetPlayerName { index, name } => (set_player_name(state, index, name), None),
            Message::SetColorPalette { name } => {
                let mut next = state.clone();
                next.palette = Palette::from_name(&name);
                next.options.set_color_palette(name);
                (next, None)
            }
            Message::SetTimeFormat { format } => {
                let mut next = state.clone();
                next.options.set_time_format(format);
                (next, None)
            }
            Message::SetOneTurnForAllPlayers { value } => {
                let mut next = state.clone();
                next.options.set_one_turn_for_all_players(value);
                (next, None)
            }
            Message::SetLoggingEnabled { value } => {
                let mut next = state.clone();
                next.options.set_logging_enabled(value);
                (next, None)
            }
        }
    }

    /// Records an entry for `player`, forwarding it to the trail when
    /// logging is enabled.
    fn record(&self, player: &mut Player, state: &GameState, message: impl Into<String>) {
        let entry = player.note(&state.phases, message);
        if *state.options.logging_enabled() {
            self.trail.submit(entry);
        }
    }

    fn start_game(&self, state: &GameState) -> GameState {
        let (status, game_started, note) = match state.status {
            GameStatus::NotStarted => (GameStatus::InProgress, true, "Game started"),
            GameStatus::InProgress => (GameStatus::Paused, state.game_started, "Game paused"),
            GameStatus::Paused => (GameStatus::InProgress, state.game_started, "Game resumed"),
        };
        info!(from = %state.status, to = %status, "Game status changed");

        let players = state
            .players
            .iter()
            .map(|p| {
                let mut p = p.clone();
                if p.is_turn {
                    self.record(&mut p, state, note);
                }
                p
            })
            .collect();

        GameState {
            players,
            status,
            game_started,
            ..state.clone()
        }
    }

    fn end_game(&self, state: &GameState) -> GameState {
        if !state.game_started {
            debug!("No game in progress, nothing to end");
            return state.clone();
        }
        info!("Game ended, resetting");

        // Reseated from the options, picking up roster edits made mid-game.
        let players = (0..*state.options.player_count())
            .map(|seat| {
                let mut p = Player::new(state.options.player_name(seat));
                p.is_turn = seat == 0;
                if seat == 0 {
                    self.record(&mut p, state, "Game ended - reset to initial state");
                } else {
                    self.record(&mut p, state, "Game ended");
                }
                p
            })
            .collect();

        GameState {
            players,
            status: GameStatus::NotStarted,
            game_started: false,
            total_game_time: Duration::ZERO,
            ..state.clone()
        }
    }

    fn switch_turns(&self, state: &GameState) -> GameState {
        let count = state.players.len();
        if count == 0 {
            return state.clone();
        }
        let current = state.active_player_index();
        let incoming = current.map_or(0, |seat| (seat + 1) % count);

        let players = state
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let mut p = p.clone();
                if current == Some(seat) {
                    let ended = format!("Turn {} ended", p.turn_count);
                    self.record(&mut p, state, ended);
                    p.is_turn = false;
                }
                if seat == incoming {
                    p.is_turn = true;
                    p.turn_count += 1;
                    p.current_phase = 0;
                    let started = format!("Turn {} started", p.turn_count);
                    self.record(&mut p, state, started);
                    if let Some(first) = state.phases.first() {
                        let entered = format!("Turn {} - Entered phase: {}", p.turn_count, first);
                        self.record(&mut p, state, entered);
                    }
                }
                p
            })
            .collect();
        debug!(from = ?current, to = incoming, "Switched turns");

        GameState {
            players,
            screen: Screen::Main,
            ..state.clone()
        }
    }

    fn shift_phase(&self, state: &GameState, forward: bool) -> GameState {
        let last = state.phases.len().checked_sub(1);
        let players = state
            .players
            .iter()
            .map(|p| {
                let mut p = p.clone();
                if !p.is_turn {
                    return p;
                }
                let target = if forward {
                    last.filter(|last| p.current_phase < *last)
                        .map(|_| p.current_phase + 1)
                } else {
                    p.current_phase.checked_sub(1)
                };
                if let Some(target) = target {
                    p.current_phase = target;
                    let started = format!("Started phase: {}", state.phases[target]);
                    self.record(&mut p, state, started);
                }
                p
            })
            .collect();

        GameState {
            players,
            screen: Screen::Main,
            ..state.clone()
        }
    }

    fn key_press(&self, state: &GameState, code: KeyCode) -> (GameState, Option<Command>) {
        if let Some(draft) = &state.name_draft {
            return self.name_key(state, draft, code);
        }
        if state.modal.is_some() {
            return match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.update(state, Some(Message::EndGameConfirm { confirmed: true }))
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.update(state, Some(Message::EndGameConfirm { confirmed: false }))
                }
                _ => unchanged(state),
            };
        }

        if state.screen == Screen::Options
            && matches!(
                code,
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Enter
            )
        {
            return self.options_key(state, code);
        }

        match code {
            KeyCode::Esc if state.screen != Screen::Main => {
                self.update(state, Some(Message::ShowMainScreen))
            }
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'o' => self.update(state, Some(Message::ShowOptions)),
                'a' => self.update(state, Some(Message::ShowAbout)),
                's' => self.update(state, Some(Message::StartGame)),
                'e' if state.game_started => (
                    state.clone(),
                    Some(Command::message(Message::ShowEndGameConfirm)),
                ),
                'p' => self.update(state, Some(Message::NextPhase)),
                'b' => self.update(state, Some(Message::PrevPhase)),
                ' ' => self.update(state, Some(Message::SwitchTurns)),
                _ => unchanged(state),
            },
            _ => unchanged(state),
        }
    }

    fn options_key(&self, state: &GameState, code: KeyCode) -> (GameState, Option<Command>) {
        let field = state.options_cursor;
        let seats = *state.options.player_count();
        let forward = match code {
            KeyCode::Up => return (with_cursor(state, field.previous(seats)), None),
            KeyCode::Down => return (with_cursor(state, field.next(seats)), None),
            KeyCode::Left => false,
            _ => true,
        };

        let options = &state.options;
        let message = match field {
            OptionField::Ruleset => {
                let count = options.rules().len();
                if count == 0 {
                    return unchanged(state);
                }
                let current = *options.default_ruleset();
                let index = if forward {
                    (current + 1) % count
                } else {
                    (current + count - 1) % count
                };
                Message::SetRuleset { index }
            }
            OptionField::PlayerCount => {
                let current = *options.player_count();
                let count = if forward {
                    (current + 1).min(MAX_PLAYERS)
                } else {
                    current.saturating_sub(1)
                };
                Message::SetPlayerCount { count }
            }
            OptionField::PlayerName(seat) => {
                if code != KeyCode::Enter {
                    return unchanged(state);
                }
                debug!(seat, "Editing player name");
                let draft = options.player_name(seat);
                return (with_draft(state, Some(draft)), None);
            }
            OptionField::ColorPalette => {
                let palette = if forward {
                    state.palette.next()
                } else {
                    state.palette.previous()
                };
                Message::SetColorPalette {
                    name: palette.to_string(),
                }
            }
            OptionField::TimeFormat => Message::SetTimeFormat {
                format: options.time_format().toggle(),
            },
            OptionField::OneTurnForAllPlayers => Message::SetOneTurnForAllPlayers {
                value: !state.one_turn_for_all_players(),
            },
            OptionField::LoggingEnabled => Message::SetLoggingEnabled {
                value: !*options.logging_enabled(),
            },
        };
        self.update(state, Some(message))
    }

    /// Keys typed while a player name row is being edited.
    fn name_key(
        &self,
        state: &GameState,
        draft: &str,
        code: KeyCode,
    ) -> (GameState, Option<Command>) {
        let OptionField::PlayerName(index) = state.options_cursor else {
            return (with_draft(state, None), None);
        };
        match code {
            KeyCode::Enter => {
                let name = draft.trim().to_string();
                self.update(
                    &with_draft(state, None),
                    Some(Message::SetPlayerName { index, name }),
                )
            }
            KeyCode::Esc => (with_draft(state, None), None),
            KeyCode::Backspace => {
                let mut draft = draft.to_string();
                draft.pop();
                (with_draft(state, Some(draft)), None)
            }
            KeyCode::Char(c) if !c.is_control() && draft.chars().count() < MAX_NAME_CHARS => {
                let mut draft = draft.to_string();
                draft.push(c);
                (with_draft(state, Some(draft)), None)
            }
            _ => unchanged(state),
        }
    }
}

fn unchanged(state: &GameState) -> (GameState, Option<Command>) {
    (state.clone(), None)
}

fn with_cursor(state: &GameState, options_cursor: OptionField) -> GameState {
    GameState {
        options_cursor,
        ..state.clone()
    }
}

fn with_draft(state: &GameState, name_draft: Option<String>) -> GameState {
    GameState {
        name_draft,
        ..state.clone()
    }
}

fn toggle_screen(state: &GameState, screen: Screen) -> GameState {
    let screen = if state.screen == screen {
        Screen::Main
    } else {
        screen
    };
    GameState {
        screen,
        ..state.clone()
    }
}

fn tick(state: &GameState) -> GameState {
    if !state.game_started || state.status != GameStatus::InProgress {
        return state.clone();
    }
    let players = state
        .players
        .iter()
        .map(|p| {
            let mut p = p.clone();
            if p.is_turn {
                p.time_elapsed += ONE_SECOND;
            }
            p
        })
        .collect();
    GameState {
        players,
        total_game_time: state.total_game_time + ONE_SECOND,
        ..state.clone()
    }
}

fn set_ruleset(state: &GameState, index: usize) -> GameState {
    let Some(rule) = state.options.rules().get(index) else {
        debug!(index, "Ruleset index out of range, ignoring");
        return state.clone();
    };
    let phases = rule.phases().clone();
    let last = phases.len().saturating_sub(1);

    let mut next = state.clone();
    next.options.set_default_ruleset(index);
    for player in &mut next.players {
        player.current_phase = player.current_phase.min(last);
    }
    next.phases = phases;
    info!(ruleset = %next.ruleset_name(), "Ruleset selected");
    next
}

fn set_player_count(state: &GameState, count: usize) -> GameState {
    if count == 0 {
        debug!("Player count must be positive, ignoring");
        return state.clone();
    }
    let mut next = state.clone();
    next.options.set_player_count(count);
    next.options.pad_player_names();
    if let OptionField::PlayerName(seat) = next.options_cursor
        && seat >= count
    {
        next.options_cursor = OptionField::PlayerName(count - 1);
    }
    if !next.game_started {
        next.players = seat_players(&next.options, &next.phases);
    }
    next
}

fn set_player_name(state: &GameState, index: usize, name: String) -> GameState {
    if index >= state.options.player_names().len() {
        debug!(index, "Player name index out of range, ignoring");
        return state.clone();
    }
    let mut next = state.clone();
    next.options.player_names_mut()[index] = name;
    let display = next.options.player_name(index);
    if !next.game_started
        && let Some(player) = next.players.get_mut(index)
    {
        player.name = display;
    }
    next
}
