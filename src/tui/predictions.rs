//! Predictions view: the prediction log, newest first.

use super::Theme;
use crate::services::Report;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Trade Log History ")
        .border_style(theme.border());

    let history = report.map(|r| r.prediction_history.as_slice()).unwrap_or(&[]);
    if history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled("No trade logs found yet.", theme.warning())))
            .block(block)
            .centered();
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = history
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(p.ticker.clone()),
                Cell::from(p.prediction.action_text()).style(theme.direction(p.prediction)),
            ])
        })
        .collect();

    let widths = [Constraint::Length(20), Constraint::Length(14), Constraint::Min(10)];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Time", "Stock", "Prediction"]).style(theme.header()))
        .block(block);
    frame.render_widget(table, area);
}
