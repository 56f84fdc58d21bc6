// Terminal status board for watch mode using ratatui
use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::utils::{describe_cadence, format_duration, RefreshClock};
use crate::watch::actions;
use crate::watch::events::{DashboardMessage, UserCommand};
use crate::watch::view::{Notice, View};

const OPEN_ALL_LINES: [&str; 2] = ["I'm not sure I trust this site.", "Open all of them."];

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub text: String,
    pub color: Color,
}

/// What the highlighted row points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Provider { name: String, url: String },
    OpenAll(Vec<String>),
}

/// Result of a key press that the dashboard has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    ToggleAlerts,
    RefreshNow,
    Open(String),
    OpenAll(Vec<String>),
    Copy(String),
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub view: View,
    pub selected: usize,
    pub show_help: bool,
    pub alerts_enabled: bool,
    pub activity: VecDeque<ActivityEntry>,
    pub title: String,
    pub cadence: String,
    pub clock: RefreshClock,
    pub debug: bool,
    pub start_time: Instant,
    pub redraw_rate: Duration,
    pub max_activity: usize,
    pub bell: bool,
    bell_pending: bool,
}

impl DashboardState {
    pub fn new(title: impl Into<String>, interval: Duration, clock: RefreshClock, alerts_enabled: bool, debug: bool) -> Self {
        DashboardState {
            view: View::new(),
            selected: 0,
            show_help: false,
            alerts_enabled,
            activity: VecDeque::new(),
            title: title.into(),
            cadence: describe_cadence(interval),
            clock,
            debug,
            start_time: Instant::now(),
            redraw_rate: Duration::from_millis(200),
            max_activity: 50,
            bell: false,
            bell_pending: false,
        }
    }

    pub fn with_bell(mut self, bell: bool) -> Self {
        self.bell = bell;
        self
    }

    /// True once per alert received since the last call, when the bell is on.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    pub fn apply_message(&mut self, message: DashboardMessage, now: DateTime<Utc>) {
        match message {
            DashboardMessage::Frame(frame) => {
                let previous = self.view.notice().cloned();
                self.view.apply_frame(&frame);

                let current = self.view.notice().cloned();
                if current != previous {
                    match current {
                        Some(notice) => {
                            let text = match &notice {
                                Notice::NotWorking(reason) => format!("{} ({})", notice.message(), reason),
                                Notice::Stale(_) => notice.message(),
                            };
                            self.push_activity(now, text, Color::Red);
                        }
                        None => self.push_activity(now, "Source is back".to_string(), Color::Green),
                    }
                }
                self.clamp_selection();
            }
            DashboardMessage::AlertsToggled(enabled) => {
                self.alerts_enabled = enabled;
                let text = if enabled { "Alerts on" } else { "Alerts off" };
                self.push_activity(now, text.to_string(), Color::Cyan);
            }
            DashboardMessage::AlertFired(alert) => {
                self.bell_pending |= self.bell;
                self.push_activity(now, alert.message(), Color::Yellow);
            }
            DashboardMessage::LoadSkipped => {
                if self.debug {
                    self.push_activity(now, "Load still running, tick skipped".to_string(), Color::Gray);
                }
            }
        }
    }

    pub fn push_activity(&mut self, at: DateTime<Utc>, text: String, color: Color) {
        self.activity.push_back(ActivityEntry { at, text, color });
        if self.activity.len() > self.max_activity {
            self.activity.pop_front();
        }
    }

    fn has_open_all_row(&self) -> bool {
        !self.view.open_all().is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.view.card_count() + usize::from(self.has_open_all_row())
    }

    pub fn select_next(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected = (self.selected + 1) % rows;
        }
    }

    pub fn select_previous(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected = (self.selected + rows - 1) % rows;
        }
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        if self.selected >= rows {
            self.selected = rows.saturating_sub(1);
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        if let Some(card) = self.view.cards().nth(self.selected) {
            return Some(Selection::Provider {
                name: card.name.clone(),
                url: card.open_url.clone(),
            });
        }
        if self.selected == self.view.card_count() && self.has_open_all_row() {
            return Some(Selection::OpenAll(self.view.open_all().to_vec()));
        }
        None
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d')) {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('h') | KeyCode::F(1) => {
                self.show_help = !self.show_help;
                KeyAction::None
            }
            KeyCode::Char('s') => KeyAction::ToggleAlerts,
            KeyCode::Char('r') => KeyAction::RefreshNow,
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                KeyAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
                KeyAction::None
            }
            KeyCode::Enter => match self.selection() {
                Some(Selection::Provider { url, .. }) => KeyAction::Open(url),
                Some(Selection::OpenAll(urls)) => KeyAction::OpenAll(urls),
                None => KeyAction::None,
            },
            KeyCode::Char('a') if self.has_open_all_row() => KeyAction::OpenAll(self.view.open_all().to_vec()),
            KeyCode::Char('y') => match self.selection() {
                Some(Selection::Provider { url, .. }) => KeyAction::Copy(url),
                _ => KeyAction::None,
            },
            _ => KeyAction::None,
        }
    }

    pub fn refresh_line(&self) -> String {
        match self.view.last_refreshed() {
            Some(at) => format!("Last page refresh: {}", self.clock.format(&at)),
            None => "Last page refresh: waiting for first load".to_string(),
        }
    }

    pub fn cadence_line(&self) -> String {
        format!("This page refreshes every {}.", self.cadence)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    state: DashboardState,
}

impl Dashboard {
    pub fn new(state: DashboardState) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Dashboard { terminal, state })
    }

    /// Draw until the user quits. Frames and alert notices arrive on
    /// `messages`; toggles and manual refreshes go back on `commands`.
    pub async fn run(
        &mut self,
        mut messages: mpsc::UnboundedReceiver<DashboardMessage>,
        commands: mpsc::UnboundedSender<UserCommand>,
    ) -> Result<()> {
        let mut redraw_timer = tokio::time::interval(self.state.redraw_rate);
        let mut last_terminal_size = self.terminal.size()?;

        loop {
            tokio::select! {
                Some(message) = messages.recv() => {
                    self.state.apply_message(message, Utc::now());
                    if self.state.take_bell() {
                        self.ring_bell();
                    }
                }

                _ = redraw_timer.tick() => {
                    let current_size = self.terminal.size()?;
                    if current_size != last_terminal_size {
                        last_terminal_size = current_size;
                        self.terminal.clear()?;
                    }
                    self.draw()?;

                    if crossterm::event::poll(Duration::from_millis(10))? {
                        if let Event::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press {
                                let action = self.state.handle_key(key);
                                if action == KeyAction::Quit {
                                    break;
                                }
                                self.perform(action, &commands);
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn perform(&mut self, action: KeyAction, commands: &mpsc::UnboundedSender<UserCommand>) {
        let now = Utc::now();
        match action {
            KeyAction::None | KeyAction::Quit => {}
            KeyAction::ToggleAlerts => {
                let _ = commands.send(UserCommand::ToggleAlerts);
            }
            KeyAction::RefreshNow => {
                let _ = commands.send(UserCommand::RefreshNow);
            }
            KeyAction::Open(url) => {
                self.state.push_activity(now, format!("Opening {}", url), Color::Cyan);
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = actions::open_in_browser(&url) {
                        tracing::warn!(error = %e, "open failed");
                    }
                });
            }
            KeyAction::OpenAll(urls) => {
                self.state.push_activity(now, format!("Opening {} sites", urls.len()), Color::Cyan);
                tokio::task::spawn_blocking(move || {
                    actions::open_all(&urls);
                });
            }
            KeyAction::Copy(url) => match actions::copy_to_clipboard(&url) {
                Ok(()) => self.state.push_activity(now, format!("Copied {}", url), Color::Cyan),
                Err(e) => self.state.push_activity(now, format!("{:#}", e), Color::Red),
            },
        }
    }

    /// BEL goes through the same backend as the frames so it never lands
    /// inside an escape sequence.
    fn ring_bell(&mut self) {
        if let Err(e) = execute!(self.terminal.backend_mut(), Print('\x07')) {
            tracing::warn!(error = %e, "failed to ring terminal bell");
        }
    }

    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let state = &self.state;
        self.terminal.draw(|f| {
            render_main_layout(f, state);
            if state.show_help {
                render_help_popup(f);
            }
        })?;
        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn render_main_layout(f: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header
            Constraint::Min(0),    // Providers and activity
            Constraint::Length(1), // Status line
        ])
        .split(f.size());

    render_header(f, chunks[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_providers(f, body[0], state);

    if state.debug && state.view.raw().is_some() {
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);
        render_activity(f, side[0], state);
        render_raw(f, side[1], state);
    } else {
        render_activity(f, body[1], state);
    }

    render_status_line(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let (alerts_text, alerts_color) = if state.alerts_enabled {
        ("ON", Color::Green)
    } else {
        ("OFF", Color::Gray)
    };

    let notice_line = match state.view.notice() {
        Some(notice) => Line::from(Span::styled(
            notice.message(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::raw(""),
    };

    let header_text = vec![
        Line::from(Span::styled(
            state.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::raw(state.refresh_line()),
        Line::from(vec![
            Span::raw(state.cadence_line()),
            Span::raw(" | Alerts: "),
            Span::styled(alerts_text, Style::default().fg(alerts_color).add_modifier(Modifier::BOLD)),
            Span::raw(" | Up: "),
            Span::styled(format_duration(state.uptime()), Style::default().fg(Color::Green)),
        ]),
        notice_line,
    ];

    let header = Paragraph::new(header_text).block(Block::default().borders(Borders::ALL).title("vaxwatch"));
    f.render_widget(header, area);
}

fn render_providers(f: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default().borders(Borders::ALL).title("Providers");

    if state.view.card_count() == 0 {
        let text = if state.view.last_refreshed().is_some() {
            "No providers reported"
        } else {
            "Loading..."
        };
        let placeholder = Paragraph::new(text).block(block).alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    let mut items: Vec<ListItem> = state
        .view
        .cards()
        .map(|card| {
            let [name, status, time] = card.lines();
            // Always three lines so cards without a time keep the same height.
            let lines = vec![
                Line::from(Span::styled(
                    format!("{} {}", card.tier.to_symbol(), name),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::raw(format!("  {}", status)),
                Line::raw(format!("  {}", time)),
            ];
            ListItem::new(lines).style(Style::default().bg(card.color.to_color()).fg(Color::Black))
        })
        .collect();

    if !state.view.open_all().is_empty() {
        items.push(
            ListItem::new(OPEN_ALL_LINES.iter().map(|l| Line::raw(*l)).collect::<Vec<_>>())
                .style(Style::default().fg(Color::Cyan)),
        );
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_activity(f: &mut Frame, area: Rect, state: &DashboardState) {
    let available_height = area.height.saturating_sub(2) as usize;

    let entries: Vec<ListItem> = state
        .activity
        .iter()
        .rev()
        .take(available_height.max(1))
        .map(|entry| {
            let timestamp = entry.at.format("%H:%M:%S");
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", timestamp), Style::default().fg(Color::Gray)),
                Span::styled(entry.text.clone(), Style::default().fg(entry.color)),
            ]))
        })
        .collect();

    let list = List::new(entries).block(Block::default().borders(Borders::ALL).title("Recent Activity"));
    f.render_widget(list, area);
}

fn render_raw(f: &mut Frame, area: Rect, state: &DashboardState) {
    let raw = state.view.raw().unwrap_or_default();
    let paragraph = Paragraph::new(raw.to_string())
        .block(Block::default().borders(Borders::ALL).title("Raw status"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_status_line(f: &mut Frame, area: Rect, state: &DashboardState) {
    let status_text = if state.row_count() == 0 {
        "'r' refresh | 's' alerts | 'h' help | 'q' quit"
    } else {
        "Enter open | 'a' open all | 'y' copy URL | 'r' refresh | 's' alerts | 'h' help | 'q' quit"
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 70, f.size());

    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled(
            "vaxwatch - Help",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("Controls:"),
        Line::raw("  Up/Down, j/k - Move selection"),
        Line::raw("  Enter        - Open selected site"),
        Line::raw("  a            - Open every site"),
        Line::raw("  y            - Copy selected URL"),
        Line::raw("  s            - Turn status-change alerts on/off"),
        Line::raw("  r            - Refresh now"),
        Line::raw("  h / F1       - Show/Hide help"),
        Line::raw("  q / Esc      - Quit"),
        Line::raw(""),
        Line::raw("Card colors:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(" probably ", Style::default().bg(Color::Rgb(144, 238, 144)).fg(Color::Black)),
            Span::raw(" "),
            Span::styled(" maybe ", Style::default().bg(Color::Rgb(240, 230, 140)).fg(Color::Black)),
            Span::raw(" "),
            Span::styled(" probably not ", Style::default().bg(Color::Rgb(240, 128, 128)).fg(Color::Black)),
            Span::raw(" "),
            Span::styled(" unknown ", Style::default().bg(Color::Rgb(128, 128, 128)).fg(Color::Black)),
        ]),
        Line::raw(""),
        Line::raw("Alerts fire when a site's status changes, except changes to 'probably not'."),
        Line::raw(""),
        Line::raw("Press 'h' again to close this help."),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
