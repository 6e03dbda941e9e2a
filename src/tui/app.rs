//! Main TUI application logic.

use super::events::{self, Action, Event};
use super::state::{LogBuffer, SessionState};
use super::{dashboard, logs, predictions, trades, Route, Theme};
use crate::services::{Pipeline, Report};
use crate::sources::MarketDataSource;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame, Terminal,
};
use std::{io, sync::Arc, time::Duration};
use tracing::debug;

pub struct App<S> {
    route: Route,
    pipeline: Pipeline<S>,
    session: SessionState,
    report: Option<Report>,
    log_buffer: Arc<LogBuffer>,
    theme: Theme,
    /// Set while a pipeline run is in flight.
    busy: Option<String>,
    should_quit: bool,
}

impl<S: MarketDataSource + Send + Sync> App<S> {
    pub fn new(pipeline: Pipeline<S>, session: SessionState, log_buffer: Arc<LogBuffer>) -> Self {
        Self {
            route: Route::Dashboard,
            pipeline,
            session,
            report: None,
            log_buffer,
            theme: Theme::default(),
            busy: None,
            should_quit: false,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Re-run the pipeline for the current selection.
    pub async fn reload(&mut self) {
        let sel = self.session.selection();
        self.report = Some(self.pipeline.run(&sel).await);
    }

    /// Status text to show while `action` runs, if it hits the pipeline.
    fn busy_message(&self, action: Action) -> Option<String> {
        match action {
            Action::NextTicker | Action::PrevTicker | Action::ShiftStart(_) | Action::ShiftEnd(_) => {
                Some("Loading...".to_string())
            }
            Action::Trade(side) => Some(format!("Executing {}...", side)),
            Action::Refresh => Some("Refreshing...".to_string()),
            _ => None,
        }
    }

    pub async fn apply(&mut self, action: Action) {
        debug!("Dashboard action: {:?}", action);
        match action {
            Action::Quit => self.should_quit = true,
            Action::Show(route) => self.route = route,
            Action::NextTicker => {
                self.session.next_ticker();
                self.reload().await;
            }
            Action::PrevTicker => {
                self.session.prev_ticker();
                self.reload().await;
            }
            Action::ShiftStart(days) => {
                if self.session.shift_start(days) {
                    self.reload().await;
                }
            }
            Action::ShiftEnd(days) => {
                if self.session.shift_end(days) {
                    self.reload().await;
                }
            }
            Action::ToggleRaw => self.session.show_raw = !self.session.show_raw,
            Action::Trade(side) => {
                let sel = self.session.selection();
                self.report = Some(self.pipeline.execute_trade(&sel, side).await);
            }
            Action::Refresh => {
                self.pipeline.refresh(&self.session.selection());
                self.reload().await;
            }
            Action::None => {}
        }
        self.busy = None;
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Status bar
            ])
            .split(frame.size());

        self.render_tabs(frame, chunks[0]);

        let report = self.report.as_ref();
        match self.route {
            Route::Dashboard => dashboard::render(frame, chunks[1], &self.session, report, &self.theme),
            Route::Trades => trades::render(frame, chunks[1], report, &self.theme),
            Route::Predictions => predictions::render(frame, chunks[1], report, &self.theme),
            Route::Logs => logs::render(frame, chunks[1], &self.log_buffer, &self.theme),
        }

        self.render_status_bar(frame, chunks[2]);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let routes = Route::all();
        let titles: Vec<Line> = routes
            .iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled(format!("[{}] ", r.key()), self.theme.muted()),
                    Span::raw(r.name().to_string()),
                ])
            })
            .collect();

        let selected = routes.iter().position(|r| *r == self.route).unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" AutoTrade AI ")
                    .border_style(self.theme.border()),
            )
            .select(selected)
            .style(self.theme.tab_inactive())
            .highlight_style(self.theme.tab_active());

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        if let Some(message) = &self.busy {
            spans.push(Span::styled(format!("{} ", message), self.theme.warning()));
            spans.push(Span::raw("| "));
        }
        for (key, label) in [
            ("←/→", " ticker  "),
            ("[ ]", " start  "),
            ("{ }", " end  "),
            ("b/s", " buy/sell  "),
            ("r", " raw  "),
            ("u", " refresh  "),
            ("1-4", " views  "),
            ("q", " quit"),
        ] {
            spans.push(Span::styled(key, self.theme.title()));
            spans.push(Span::styled(label, self.theme.muted()));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Line::from(spans), inner);
    }
}

/// Run the dashboard until the user quits.
pub async fn run_tui<S: MarketDataSource + Send + Sync>(mut app: App<S>) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop<S: MarketDataSource + Send + Sync>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> io::Result<()> {
    let mut events = events::EventHandler::new(Duration::from_millis(250));

    app.busy = Some("Loading...".to_string());
    terminal.draw(|f| app.render(f))?;
    app.reload().await;
    app.busy = None;

    while !app.should_quit() {
        terminal.draw(|f| app.render(f))?;

        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                let action = events::action_for_key(&key);
                if let Some(message) = app.busy_message(action) {
                    app.busy = Some(message);
                    terminal.draw(|f| app.render(f))?;
                }
                app.apply(action).await;
            }
            Event::Resize(width, height) => debug!("Terminal resized to {}x{}", width, height),
            // Redraw on the next pass so new log lines show up.
            Event::Tick => {}
        }
    }

    Ok(())
}
