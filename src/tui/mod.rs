//! Terminal dashboard.

mod app;
mod dashboard;
mod events;
mod logs;
mod predictions;
mod state;
mod theme;
mod trades;

pub use app::{run_tui, App};
pub use events::{action_for_key, Action};
pub use state::{LogBuffer, LogMakeWriter, SessionState};
pub use theme::Theme;

/// Views reachable from the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Trades,
    Predictions,
    Logs,
}

impl Route {
    pub fn all() -> Vec<Self> {
        vec![Self::Dashboard, Self::Trades, Self::Predictions, Self::Logs]
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Trades => "Trades",
            Self::Predictions => "Predictions",
            Self::Logs => "Logs",
        }
    }

    /// Shortcut key.
    pub fn key(&self) -> char {
        match self {
            Self::Dashboard => '1',
            Self::Trades => '2',
            Self::Predictions => '3',
            Self::Logs => '4',
        }
    }
}
