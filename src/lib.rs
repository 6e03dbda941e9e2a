//! AutoTrade - terminal trading assistant with next-day direction forecasts.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod tui;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use types::*;
