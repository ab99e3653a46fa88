//! Source code pane rendering with syntax highlighting
//!
//! Displays the program with the line of the current frame highlighted. An
//! ERROR frame paints its line red.
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without running the real lexer, so half-typed or
//! invalid source still renders.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn highlight_source_code(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            flush(&mut current_word, &mut spans, false);
            let rest: String = chars[i..].iter().collect();
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        if c == '"' || c == '\'' || c == '`' {
            flush(&mut current_word, &mut spans, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            let literal: String = chars[i..end].iter().collect();
            spans.push(Span::styled(literal, Style::default().fg(DEFAULT_THEME.string)));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' && c != '$' {
            flush(&mut current_word, &mut spans, c == '(');
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }
    flush(&mut current_word, &mut spans, false);

    Line::from(spans)
}

fn flush(word: &mut String, spans: &mut Vec<Span<'static>>, is_call: bool) {
    if !word.is_empty() {
        let style = word_style(word, is_call);
        spans.push(Span::styled(std::mem::take(word), style));
    }
}

fn word_style(word: &str, is_call: bool) -> Style {
    match word {
        "let" | "const" | "function" | "return" | "if" | "else" | "while" | "for" | "of" | "in"
        | "repeat" | "break" | "continue" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is kept at; `None` until the first render
    pub target_line_row: Option<usize>,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: usize,
    is_error: bool,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;
            let mut content = highlight_source_code(line);

            let num_style = if is_current && is_error {
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.error)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content.spans {
                    span.style = error_style;
                }
                Style::default().fg(DEFAULT_THEME.error).add_modifier(Modifier::BOLD)
            } else if is_current {
                for span in &mut content.spans {
                    span.style = span.style.patch(Style::default().bg(DEFAULT_THEME.current_line_bg));
                }
                Style::default().fg(DEFAULT_THEME.secondary).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}
