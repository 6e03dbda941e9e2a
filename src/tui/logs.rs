//! Logs view: captured tracing output.

use super::state::LogBuffer;
use super::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Lines kept on screen.
const VISIBLE_LINES: usize = 200;

fn line_style(line: &str, theme: &Theme) -> Style {
    if line.contains("ERROR") {
        theme.error()
    } else if line.contains("WARN") {
        theme.warning()
    } else if line.contains("INFO") {
        theme.success()
    } else if line.contains("DEBUG") {
        theme.muted()
    } else {
        theme.info()
    }
}

pub fn render(frame: &mut Frame, area: Rect, buffer: &LogBuffer, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Logs (newest first) ")
        .border_style(theme.border());

    let lines = buffer.recent(VISIBLE_LINES);
    if lines.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled("No logs yet.", theme.muted())))
            .block(block)
            .centered();
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = lines
        .into_iter()
        .rev()
        .map(|line| {
            let style = line_style(&line, theme);
            ListItem::new(Line::from(Span::styled(line, style)))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_style_by_level() {
        let theme = Theme::default();
        assert_eq!(line_style("2024 ERROR boom", &theme), theme.error());
        assert_eq!(line_style("2024  WARN no data", &theme), theme.warning());
        assert_eq!(line_style("2024 DEBUG cache hit", &theme), theme.muted());
    }
}
