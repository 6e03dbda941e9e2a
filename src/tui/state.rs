//! Dashboard session state and log buffering.

use crate::types::Selection;
use chrono::{Duration, NaiveDate};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Days moved by one date-range key press.
pub const DATE_STEP_DAYS: i64 = 30;

/// In-memory log buffer shown by the Logs view.
pub struct LogBuffer {
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push_line(&self, line: String) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.push_back(line);
        while lines.len() > self.capacity {
            lines.pop_front();
        }
    }

    /// The most recent lines, oldest first, up to `limit`.
    pub fn recent(&self, limit: usize) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        let start = lines.len().saturating_sub(limit);
        lines.iter().skip(start).cloned().collect()
    }
}

/// Line-splitting writer feeding a [`LogBuffer`].
pub struct LogWriter {
    buffer: Arc<LogBuffer>,
    line: Vec<u8>,
}

impl LogWriter {
    fn emit(&mut self) {
        if !self.line.is_empty() {
            let line = String::from_utf8_lossy(&self.line).to_string();
            self.buffer.push_line(line);
            self.line.clear();
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            if b == b'\n' {
                self.emit();
            } else {
                self.line.push(b);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

/// `MakeWriter` for the tracing fmt layer.
pub struct LogMakeWriter {
    buffer: Arc<LogBuffer>,
}

impl LogMakeWriter {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            line: Vec::new(),
        }
    }
}

/// Ticker and date range picked by the user.
#[derive(Debug, Clone)]
pub struct SessionState {
    tickers: Vec<String>,
    index: usize,
    start: NaiveDate,
    end: NaiveDate,
    /// Show the raw bar table on the dashboard.
    pub show_raw: bool,
}

impl SessionState {
    pub fn new(tickers: Vec<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            tickers,
            index: 0,
            start,
            end,
            show_raw: false,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn ticker(&self) -> &str {
        self.tickers.get(self.index).map(String::as_str).unwrap_or("")
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.ticker(), self.start, self.end)
    }

    pub fn next_ticker(&mut self) {
        if !self.tickers.is_empty() {
            self.index = (self.index + 1) % self.tickers.len();
        }
    }

    pub fn prev_ticker(&mut self) {
        if !self.tickers.is_empty() {
            self.index = (self.index + self.tickers.len() - 1) % self.tickers.len();
        }
    }

    /// Move the start date; refused when it would reach the end date.
    pub fn shift_start(&mut self, days: i64) -> bool {
        let start = self.start + Duration::days(days);
        if start >= self.end {
            return false;
        }
        self.start = start;
        true
    }

    /// Move the end date; refused when it would reach the start date.
    pub fn shift_end(&mut self, days: i64) -> bool {
        let end = self.end + Duration::days(days);
        if end <= self.start {
            return false;
        }
        self.end = end;
        true
    }
}
