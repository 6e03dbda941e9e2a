//! Dashboard view: chart, indicators, prediction and trade controls.

use super::state::SessionState;
use super::Theme;
use crate::services::{PredictionOutcome, Report};
use crate::types::{IndicatorRow, PriceBar};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Wrap},
    Frame,
};

/// Bars shown in the raw data table.
const RAW_ROWS: usize = 5;

pub fn render(frame: &mut Frame, area: Rect, session: &SessionState, report: Option<&Report>, theme: &Theme) {
    let raw_height = if session.show_raw { RAW_ROWS as u16 + 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),          // Selector
            Constraint::Percentage(50),     // Price + prediction
            Constraint::Min(8),             // Indicators
            Constraint::Length(raw_height), // Raw data
        ])
        .split(area);

    render_selector(frame, chunks[0], session, report, theme);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);
    render_price_chart(frame, top[0], report, theme);
    render_prediction(frame, top[1], report, theme);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    let rows = report.map(|r| r.indicators.as_slice()).unwrap_or(&[]);
    render_rsi(frame, bottom[0], rows, theme);
    render_macd(frame, bottom[1], rows, theme);

    if session.show_raw {
        let bars = report.map(|r| r.bars.as_slice()).unwrap_or(&[]);
        render_raw(frame, chunks[3], bars, theme);
    }
}

fn render_selector(frame: &mut Frame, area: Rect, session: &SessionState, report: Option<&Report>, theme: &Theme) {
    let mut spans = Vec::new();
    for ticker in session.tickers() {
        let style = if ticker == session.ticker() {
            theme.tab_active()
        } else {
            theme.muted()
        };
        spans.push(Span::styled(format!(" {} ", ticker), style));
        spans.push(Span::raw(" "));
    }

    let sel = session.selection();
    spans.push(Span::styled("  Range: ", theme.muted()));
    spans.push(Span::raw(format!("{} .. {}", sel.start, sel.end)));
    if let Some(report) = report {
        spans.push(Span::styled(format!("  ({} bars)", report.bars.len()), theme.muted()));
    }

    let block = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Stock ")
            .border_style(theme.border()),
    );
    frame.render_widget(block, area);
}

/// `(min, max)` with a little headroom; a flat series gets a unit band.
fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.05).max(0.5);
    [min - pad, max + pad]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    vec![
        Span::raw(format!("{:.2}", bounds[0])),
        Span::raw(format!("{:.2}", mid)),
        Span::raw(format!("{:.2}", bounds[1])),
    ]
}

fn date_labels<'a>(first: Option<&PriceBar>, last: Option<&PriceBar>) -> Vec<Span<'a>> {
    match (first, last) {
        (Some(a), Some(b)) => vec![Span::raw(a.date.to_string()), Span::raw(b.date.to_string())],
        _ => vec![],
    }
}

fn empty_panel(frame: &mut Frame, area: Rect, title: &str, message: &str, theme: &Theme) {
    let block = Paragraph::new(Line::from(Span::styled(message.to_string(), theme.muted())))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(theme.border()),
        )
        .centered();
    frame.render_widget(block, area);
}

fn render_price_chart(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let title = report
        .map(|r| format!(" Price Chart for {} ", r.selection.ticker))
        .unwrap_or_else(|| " Price Chart ".to_string());

    let bars = report.map(|r| r.bars.as_slice()).unwrap_or(&[]);
    if bars.is_empty() {
        empty_panel(frame, area, &title, "No data available for the selected range.", theme);
        return;
    }

    let points: Vec<(f64, f64)> = bars.iter().enumerate().map(|(i, b)| (i as f64, b.close)).collect();
    let y = bounds(bars.iter().map(|b| b.close));

    let chart = Chart::new(vec![Dataset::default()
        .name("Close")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.title())
        .data(&points)])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(theme.border()),
    )
    .x_axis(
        Axis::default()
            .style(theme.muted())
            .bounds([0.0, (bars.len().saturating_sub(1)).max(1) as f64])
            .labels(date_labels(bars.first(), bars.last())),
    )
    .y_axis(Axis::default().style(theme.muted()).bounds(y).labels(axis_labels(y)));

    frame.render_widget(chart, area);
}

fn series(rows: &[IndicatorRow], pick: impl Fn(&IndicatorRow) -> Option<f64>) -> Vec<(f64, f64)> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, r)| pick(r).filter(|v| v.is_finite()).map(|v| (i as f64, v)))
        .collect()
}

fn render_rsi(frame: &mut Frame, area: Rect, rows: &[IndicatorRow], theme: &Theme) {
    let rsi = series(rows, |r| r.rsi);
    if rsi.is_empty() {
        empty_panel(frame, area, " RSI (14) ", "Not enough clean data to show indicators.", theme);
        return;
    }

    let x_max = (rows.len().saturating_sub(1)).max(1) as f64;
    let overbought = [(0.0, 70.0), (x_max, 70.0)];
    let oversold = [(0.0, 30.0), (x_max, 30.0)];

    let chart = Chart::new(vec![
        Dataset::default()
            .name("RSI")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.info())
            .data(&rsi),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme.error())
            .data(&overbought),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme.success())
            .data(&oversold),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" RSI (14) ")
            .border_style(theme.border()),
    )
    .x_axis(Axis::default().style(theme.muted()).bounds([0.0, x_max]))
    .y_axis(
        Axis::default()
            .style(theme.muted())
            .bounds([0.0, 100.0])
            .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
    );

    frame.render_widget(chart, area);
}

fn render_macd(frame: &mut Frame, area: Rect, rows: &[IndicatorRow], theme: &Theme) {
    let macd = series(rows, |r| r.macd);
    let signal = series(rows, |r| r.macd_signal);
    if macd.is_empty() {
        empty_panel(frame, area, " MACD (12, 26, 9) ", "Not enough clean data to show indicators.", theme);
        return;
    }

    let y = bounds(macd.iter().chain(signal.iter()).map(|p| p.1));
    let x_max = (rows.len().saturating_sub(1)).max(1) as f64;

    let chart = Chart::new(vec![
        Dataset::default()
            .name("MACD")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.title())
            .data(&macd),
        Dataset::default()
            .name("Signal")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.warning())
            .data(&signal),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" MACD (12, 26, 9) ")
            .border_style(theme.border()),
    )
    .x_axis(Axis::default().style(theme.muted()).bounds([0.0, x_max]))
    .y_axis(Axis::default().style(theme.muted()).bounds(y).labels(axis_labels(y)));

    frame.render_widget(chart, area);
}

fn render_prediction(frame: &mut Frame, area: Rect, report: Option<&Report>, theme: &Theme) {
    let mut lines = Vec::new();

    match report.map(|r| &r.outcome) {
        Some(PredictionOutcome::Predicted(direction)) => {
            lines.push(Line::from(Span::styled("AI Predicts:", theme.header())));
            lines.push(Line::from(Span::styled(direction.label(), theme.direction(*direction))));
        }
        Some(PredictionOutcome::NoPrediction(reason)) => {
            lines.push(Line::from(Span::styled("No prediction", theme.warning())));
            lines.push(Line::from(Span::styled(reason.clone(), theme.muted())));
        }
        None => lines.push(Line::from(Span::styled("Loading...", theme.muted()))),
    }

    if let Some(price) = report.and_then(Report::latest_price) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Last close: ", theme.muted()),
            Span::raw(format!("₹{:.2}", price)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" b ", theme.tab_active()),
        Span::styled(" Execute BUY   ", theme.success()),
    ]));
    lines.push(Line::from(vec![
        Span::styled(" s ", theme.tab_active()),
        Span::styled(" Execute SELL", theme.error()),
    ]));

    if let Some(report) = report {
        if !report.notices.is_empty() {
            lines.push(Line::from(""));
        }
        for notice in &report.notices {
            lines.push(Line::from(Span::styled(
                notice.message.clone(),
                theme.severity(notice.severity),
            )));
        }
    }

    let block = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" AI Prediction ")
            .border_style(theme.border()),
    );
    frame.render_widget(block, area);
}

fn render_raw(frame: &mut Frame, area: Rect, bars: &[PriceBar], theme: &Theme) {
    let start = bars.len().saturating_sub(RAW_ROWS);
    let rows: Vec<Row> = bars[start..]
        .iter()
        .map(|b| {
            Row::new(vec![
                Cell::from(b.date.to_string()),
                Cell::from(format!("{:.2}", b.open)),
                Cell::from(format!("{:.2}", b.high)),
                Cell::from(format!("{:.2}", b.low)),
                Cell::from(format!("{:.2}", b.close)),
                Cell::from(format!("{:.0}", b.volume)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Date", "Open", "High", "Low", "Close", "Volume"]).style(theme.header()))
        .style(Style::default())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Raw Data ")
                .border_style(theme.border()),
        );
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_pads_range() {
        let b = bounds([10.0, 20.0].into_iter());
        assert!(b[0] < 10.0 && b[1] > 20.0);
    }

    #[test]
    fn test_bounds_flat_and_empty() {
        assert_eq!(bounds([5.0, 5.0].into_iter()), [4.5, 5.5]);
        assert_eq!(bounds(std::iter::empty()), [0.0, 1.0]);
    }
}
