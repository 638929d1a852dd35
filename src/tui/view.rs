//! Stateless rendering of the game state.

use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::sync::watch;
use tracing::instrument;

use crate::game::{GameState, GameStatus, Modal, OptionField, Player, Screen};
use crate::palette::ColorTable;
use crate::runtime::Renderer;

/// Renders state snapshots to a ratatui terminal.
///
/// The clock in the top bar comes from the watch channel the scheduler
/// refreshes; everything else comes from the state.
#[derive(Debug)]
pub struct TerminalView<B: Backend> {
    terminal: Terminal<B>,
    clock: watch::Receiver<DateTime<Local>>,
    typing: Option<watch::Sender<bool>>,
}

impl<B: Backend> TerminalView<B> {
    /// Creates a view over `terminal` reading the time from `clock`.
    pub fn new(terminal: Terminal<B>, clock: watch::Receiver<DateTime<Local>>) -> Self {
        Self {
            terminal,
            clock,
            typing: None,
        }
    }

    /// Publishes on `typing` whether each rendered state is editing a
    /// player name.
    pub fn with_typing(mut self, typing: watch::Sender<bool>) -> Self {
        self.typing = Some(typing);
        self
    }

    /// The underlying terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Consumes the view, returning the terminal.
    pub fn into_terminal(self) -> Terminal<B> {
        self.terminal
    }
}

impl<B> Renderer for TerminalView<B>
where
    B: Backend,
    <B as Backend>::Error: Send + Sync + 'static,
{
    #[instrument(level = "trace", skip_all)]
    fn render(&mut self, state: &GameState) -> anyhow::Result<()> {
        if let Some(typing) = &self.typing {
            let editing = state.name_draft().is_some();
            typing.send_if_modified(|current| {
                let changed = *current != editing;
                *current = editing;
                changed
            });
        }
        let now = *self.clock.borrow();
        self.terminal.draw(|frame| draw(frame, state, now))?;
        Ok(())
    }
}

/// Formats a duration as `HH:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Draws one frame for `state` with the clock showing `now`.
pub fn draw(frame: &mut Frame, state: &GameState, now: DateTime<Local>) {
    let colors = state.palette().colors();
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top bar
            Constraint::Min(5),    // Body
            Constraint::Length(3), // Status
            Constraint::Length(1), // Menu
        ])
        .split(area);

    draw_top_bar(frame, chunks[0], state, now, &colors);
    match state.screen() {
        Screen::Main => draw_players(frame, chunks[1], state, &colors),
        Screen::Options => draw_options(frame, chunks[1], state, &colors),
        Screen::About => draw_about(frame, chunks[1], &colors),
    }
    draw_status(frame, chunks[2], state, &colors);
    draw_menu(frame, chunks[3], state, &colors);

    if let Some(modal) = state.modal() {
        draw_modal(frame, area, *modal, &colors);
    }
}

fn draw_top_bar(
    frame: &mut Frame,
    area: Rect,
    state: &GameState,
    now: DateTime<Local>,
    colors: &ColorTable,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    let menu = Paragraph::new(Line::from(vec![
        key_span("O", colors),
        Span::styled(" Options  ", Style::default().fg(*colors.white())),
        key_span("A", colors),
        Span::styled(" About", Style::default().fg(*colors.white())),
    ]));
    frame.render_widget(menu, cols[0]);

    let title = Paragraph::new(state.ruleset_name())
        .style(Style::default().fg(*colors.cyan()).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, cols[1]);

    let clock = Paragraph::new(now.format(state.options().time_format().pattern()).to_string())
        .style(Style::default().fg(*colors.white()))
        .alignment(Alignment::Right);
    frame.render_widget(clock, cols[2]);
}

fn draw_players(frame: &mut Frame, area: Rect, state: &GameState, colors: &ColorTable) {
    let count = state.players().len().max(1) as u32;
    let constraints: Vec<_> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (seat, (player, col)) in state.players().iter().zip(cols.iter()).enumerate() {
        draw_player(frame, *col, state, seat, player, colors);
    }
}

fn seat_color(seat: usize, colors: &ColorTable) -> Color {
    match seat % 4 {
        0 => *colors.blue(),
        1 => *colors.yellow(),
        2 => *colors.green(),
        _ => *colors.red(),
    }
}

fn draw_player(
    frame: &mut Frame,
    area: Rect,
    state: &GameState,
    seat: usize,
    player: &Player,
    colors: &ColorTable,
) {
    let accent = seat_color(seat, colors);
    let (border, title_style) = if *player.is_turn() {
        (
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
            Style::default()
                .fg(*colors.black())
                .bg(accent)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(*colors.dim_white()),
            Style::default().fg(*colors.dim_white()),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", player.name()), title_style));

    let label = Style::default().fg(*colors.dim_white());
    let value = Style::default().fg(*colors.white());

    let turn_line = if state.one_turn_for_all_players() {
        Line::from(vec![
            Span::styled("Turn: ", label),
            Span::styled(player.turn_count().to_string(), value),
        ])
    } else {
        Line::from(vec![
            Span::styled("Turn: ", label),
            Span::styled(player.turn_count().to_string(), value),
            Span::styled("  Phase: ", label),
            Span::styled(player.phase_name(state.phases()).unwrap_or("-"), value),
        ])
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Time Elapsed: ", label),
            Span::styled(
                format_duration(*player.time_elapsed()),
                Style::default().fg(*colors.cyan()).add_modifier(Modifier::BOLD),
            ),
        ]),
        turn_line,
        Line::from(""),
        Line::from(Span::styled("Action Log", label.add_modifier(Modifier::UNDERLINED))),
    ];

    // Newest entries that fit inside the borders.
    let room = (area.height as usize).saturating_sub(2 + lines.len());
    let log = player.action_log();
    let shown = log.len().min(room);
    lines.extend(log[log.len() - shown..].iter().map(|entry| {
        Line::from(vec![
            Span::styled(
                format!("{} ", entry.date_time().format("%H:%M:%S")),
                label,
            ),
            Span::styled(entry.message().clone(), value),
        ])
    }));

    let panel = Paragraph::new(lines).block(block);
    frame.render_widget(panel, area);
}

fn option_value(state: &GameState, field: OptionField) -> String {
    let options = state.options();
    let on_off = |flag: bool| String::from(if flag { "On" } else { "Off" });
    match field {
        OptionField::Ruleset => state.ruleset_name().to_string(),
        OptionField::PlayerCount => options.player_count().to_string(),
        OptionField::PlayerName(seat) => match state.name_draft() {
            Some(draft) if *state.options_cursor() == field => format!("{draft}_"),
            _ => options.player_name(seat),
        },
        OptionField::ColorPalette => state.palette().to_string(),
        OptionField::TimeFormat => options.time_format().to_string(),
        OptionField::OneTurnForAllPlayers => on_off(state.one_turn_for_all_players()),
        OptionField::LoggingEnabled => on_off(*options.logging_enabled()),
    }
}

fn draw_options(frame: &mut Frame, area: Rect, state: &GameState, colors: &ColorTable) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let rows = OptionField::rows(*state.options().player_count());
    let items: Vec<ListItem> = rows
        .iter()
        .map(|&field| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<28}", field.label()),
                    Style::default().fg(*colors.white()),
                ),
                Span::styled(
                    format!("< {} >", option_value(state, field)),
                    Style::default().fg(*colors.yellow()),
                ),
            ]))
        })
        .collect();
    let selected = rows.iter().position(|f| f == state.options_cursor());

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(*colors.cyan()))
                .title(" Options "),
        )
        .highlight_style(
            Style::default()
                .fg(*colors.black())
                .bg(*colors.cyan())
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(selected);
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    let hint = if state.name_draft().is_some() {
        "Type a name, Enter to save, Esc to cancel"
    } else {
        "Up/Down select, Left/Right change, Enter edits a name, Esc returns"
    };
    let hint = Paragraph::new(hint)
        .style(Style::default().fg(*colors.dim_white()))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(hint, chunks[1]);
}

fn draw_about(frame: &mut Frame, area: Rect, colors: &ColorTable) {
    let text = vec![
        Line::from(Span::styled(
            format!("Strictly Clock {}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(*colors.cyan()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(env!("CARGO_PKG_DESCRIPTION")),
        Line::from(""),
        Line::from("Tracks whose turn it is, the current phase, and how long"),
        Line::from("each player has spent thinking. Every action is appended"),
        Line::from("to logs.csv when logging is enabled."),
        Line::from(""),
        Line::from(env!("CARGO_PKG_REPOSITORY")),
    ];
    let about = Paragraph::new(text)
        .style(Style::default().fg(*colors.white()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(*colors.cyan()))
                .title(" About "),
        );
    frame.render_widget(about, area);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &GameState, colors: &ColorTable) {
    let color = match state.status() {
        GameStatus::NotStarted => *colors.cyan(),
        GameStatus::InProgress => *colors.green(),
        GameStatus::Paused => *colors.yellow(),
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            state.status().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  |  Total game time: ", Style::default().fg(*colors.dim_white())),
        Span::styled(
            format_duration(*state.total_game_time()),
            Style::default().fg(*colors.white()),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(status, area);
}

/// Label for the start key in the bottom menu.
pub fn start_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::NotStarted => "Start Game",
        GameStatus::InProgress => "Pause Game",
        GameStatus::Paused => "Resume Game",
    }
}

fn draw_menu(frame: &mut Frame, area: Rect, state: &GameState, colors: &ColorTable) {
    let text = Style::default().fg(*colors.white());
    let mut spans = vec![
        key_span("S", colors),
        Span::styled(format!(" {}  ", start_label(*state.status())), text),
    ];
    if *state.game_started() {
        spans.push(key_span("E", colors));
        spans.push(Span::styled(" End Game  ", text));
    }
    if !state.one_turn_for_all_players() {
        spans.push(key_span("P", colors));
        spans.push(Span::styled(" Next Phase  ", text));
        spans.push(key_span("B", colors));
        spans.push(Span::styled(" Prev Phase  ", text));
    }
    spans.push(key_span("Space", colors));
    spans.push(Span::styled(" Switch Turns  ", text));
    spans.push(key_span("Q", colors));
    spans.push(Span::styled(" Quit", text));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn key_span(key: &str, colors: &ColorTable) -> Span<'static> {
    Span::styled(
        format!("[{}]", key),
        Style::default().fg(*colors.yellow()).add_modifier(Modifier::BOLD),
    )
}

fn draw_modal(frame: &mut Frame, area: Rect, modal: Modal, colors: &ColorTable) {
    let (title, body) = match modal {
        Modal::EndGameConfirm => (
            " End Game ",
            "End the current game? Timers and turn counts will be reset.",
        ),
    };
    let popup = center_rect(area, 50, 7);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(body),
        Line::from(""),
        Line::from(vec![
            key_span("Y", colors),
            Span::raw(" Yes    "),
            key_span("N", colors),
            Span::raw(" No"),
        ]),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(*colors.white()).bg(*colors.black()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(*colors.red()))
                .title(title),
        );
    frame.render_widget(dialog, popup);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width - width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}
