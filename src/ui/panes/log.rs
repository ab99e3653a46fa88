//! Console output pane rendering

use crate::snapshot::LogLine;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Lines logged at or before `time`.
pub fn visible_log_lines(log_lines: &[LogLine], time: usize) -> &[LogLine] {
    let end = log_lines.partition_point(|line| line.time <= time);
    &log_lines[..end]
}

/// Render the console pane
pub fn render_log_pane(frame: &mut Frame, area: Rect, lines: &[LogLine], is_focused: bool, scroll_offset: &mut usize) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if lines.len() > visible_height {
        *scroll_offset = (*scroll_offset).min(lines.len() - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = lines
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| ListItem::new(line.output.as_str()).style(Style::default().fg(DEFAULT_THEME.fg)))
        .collect();

    frame.render_widget(List::new(items).block(block.padding(Padding::new(1, 0, 0, 0))), area);
}
