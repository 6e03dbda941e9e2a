//! Terminal events and key bindings.

use super::state::DATE_STEP_DAYS;
use super::Route;
use crate::types::TradeAction;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
}

/// Polls crossterm on a blocking thread and forwards events over a channel.
pub struct EventHandler {
    _tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::task::spawn_blocking(move || loop {
            let event = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                    Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                    _ => continue,
                }
            } else {
                Event::Tick
            };
            if event_tx.send(event).is_err() {
                break;
            }
        });

        Self { _tx: tx, rx }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Show(Route),
    NextTicker,
    PrevTicker,
    ShiftStart(i64),
    ShiftEnd(i64),
    ToggleRaw,
    Trade(TradeAction),
    Refresh,
    None,
}

/// Check if a key event is Ctrl+C or `q`.
pub fn is_quit(event: &KeyEvent) -> bool {
    event.code == KeyCode::Char('c') && event.modifiers == KeyModifiers::CONTROL
        || event.code == KeyCode::Char('q')
}

/// Map a key press to an [`Action`].
///
/// Shift is ignored so `{` and `}` work on every layout.
pub fn action_for_key(key: &KeyEvent) -> Action {
    if is_quit(key) {
        return Action::Quit;
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return Action::None;
    }

    match key.code {
        KeyCode::Left => Action::PrevTicker,
        KeyCode::Right => Action::NextTicker,
        KeyCode::Char('[') => Action::ShiftStart(-DATE_STEP_DAYS),
        KeyCode::Char(']') => Action::ShiftStart(DATE_STEP_DAYS),
        KeyCode::Char('{') => Action::ShiftEnd(-DATE_STEP_DAYS),
        KeyCode::Char('}') => Action::ShiftEnd(DATE_STEP_DAYS),
        KeyCode::Char('r') => Action::ToggleRaw,
        KeyCode::Char('b') => Action::Trade(TradeAction::Buy),
        KeyCode::Char('s') => Action::Trade(TradeAction::Sell),
        KeyCode::Char('u') => Action::Refresh,
        KeyCode::Char(c) => Route::all()
            .into_iter()
            .find(|r| r.key() == c)
            .map(Action::Show)
            .unwrap_or(Action::None),
        _ => Action::None,
    }
}
