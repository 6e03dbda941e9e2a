//! Trades view: fake trade history and performance summary.

use super::Theme;
use crate::services::Report;
use crate::types::{PositionState, TradeAction};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    render_summary(frame, chunks[0], report, theme);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_history(frame, lower[0], report, theme);
    render_closed(frame, lower[1], report, theme);
}

fn block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(theme.border())
}

fn render_summary(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let lines = match report.map(|r| &r.summary) {
        Some(summary) if !summary.is_empty() => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Total Profit/Loss: ", theme.muted()),
                    Span::styled(format!("₹{:.2}", summary.total_pnl), theme.pnl(summary.total_pnl)),
                ]),
                Line::from(vec![
                    Span::styled("Win Rate:          ", theme.muted()),
                    Span::raw(format!("{:.2}%", summary.win_rate_pct)),
                ]),
                Line::from(vec![
                    Span::styled("Total Trades:      ", theme.muted()),
                    Span::raw(summary.trade_count.to_string()),
                ]),
            ];
            if let PositionState::Long { entry_price } = summary.open_position {
                lines.push(Line::from(vec![
                    Span::styled("Open position:     ", theme.muted()),
                    Span::styled(format!("LONG from ₹{:.2}", entry_price), theme.info()),
                ]));
            }
            lines
        }
        _ => vec![Line::from(Span::styled(
            "You haven't completed any BUY-SELL pair yet to calculate profit.",
            theme.muted(),
        ))],
    };

    frame.render_widget(Paragraph::new(lines).block(block(" Trade Performance Summary ", theme)), area);
}

fn render_history(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let history = report.map(|r| r.trade_history.as_slice()).unwrap_or(&[]);
    if history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled("No fake trades executed yet.", theme.muted())))
            .block(block(" Fake Trade History ", theme));
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = history
        .iter()
        .map(|t| {
            let action_style = match t.action {
                TradeAction::Buy => theme.success(),
                TradeAction::Sell => theme.error(),
            };
            Row::new(vec![
                Cell::from(t.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(t.ticker.clone()),
                Cell::from(t.action.to_string()).style(action_style),
                Cell::from(format!("{:.2}", t.price)),
                Cell::from(t.prediction.action_text()).style(theme.direction(t.prediction)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Time", "Stock", "Action", "Price", "Prediction"]).style(theme.header()))
        .block(block(" Fake Trade History (newest first) ", theme));
    frame.render_widget(table, area);
}

fn render_closed(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let closed = report.map(|r| r.summary.closed_trades.as_slice()).unwrap_or(&[]);

    let rows: Vec<Row> = closed
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(format!("{:.2}", t.entry_price)),
                Cell::from(format!("{:.2}", t.exit_price)),
                Cell::from(format!("{:+.2}", t.profit_loss)).style(theme.pnl(t.profit_loss)),
                Cell::from(t.exit_timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Min(19),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Entry", "Exit", "Profit/Loss", "Timestamp"]).style(theme.header()))
        .block(block(" Trade Summary Table ", theme));
    frame.render_widget(table, area);
}
