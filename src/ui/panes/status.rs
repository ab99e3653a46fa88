//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the step description and the keybindings.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    description: &str,
    current_step: usize,
    total_steps: usize,
    is_error: bool,
    is_playing: bool,
) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let step_text = if total_steps == 0 {
        " Step 0/0 ".to_string()
    } else {
        format!(" Step {}/{} ", current_step + 1, total_steps)
    };
    let accent = if is_error { DEFAULT_THEME.error } else { DEFAULT_THEME.primary };

    let left_spans = vec![
        Span::styled(
            step_text,
            Style::default().bg(accent).fg(Color::Black).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", description),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(if is_error { DEFAULT_THEME.error } else { DEFAULT_THEME.fg }),
        ),
    ];
    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default().bg(DEFAULT_THEME.current_line_bg).fg(DEFAULT_THEME.fg);
    let sep_style = Style::default().bg(DEFAULT_THEME.current_line_bg).fg(DEFAULT_THEME.comment);
    let badge = |text: &'static str, bg: Color| {
        Span::styled(text, Style::default().bg(bg).fg(Color::Black).add_modifier(Modifier::BOLD))
    };

    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / ⌫ ", key_style),
        Span::styled(" end/start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let is_at_end = current_step + 1 >= total_steps;
    if is_playing {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" ▶ PLAYING ", DEFAULT_THEME.secondary));
    } else if is_at_end {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" END ", DEFAULT_THEME.error));
    } else if current_step == 0 {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" START ", DEFAULT_THEME.success));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            .alignment(Alignment::Right),
        layout[1],
    );
}
