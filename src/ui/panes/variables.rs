//! Variables pane: the bindings visible at the current frame
//!
//! Values that differ from the previous frame are highlighted so the student
//! can see what the step changed.

use crate::memory::value::Value;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};
use std::collections::BTreeMap;

/// Names whose value is new or different compared to `previous`.
pub fn changed_names(current: &BTreeMap<String, Value>, previous: Option<&BTreeMap<String, Value>>) -> Vec<String> {
    current
        .iter()
        .filter(|(name, value)| previous.and_then(|previous| previous.get(*name)) != Some(*value))
        .map(|(name, _)| name.clone())
        .collect()
}

fn value_style(value: &Value) -> Style {
    match value {
        Value::Number(_) | Value::Boolean(_) | Value::Null | Value::Undefined => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        Value::String(_) => Style::default().fg(DEFAULT_THEME.string),
        Value::Function(_) => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    variables: &BTreeMap<String, Value>,
    changed: &[String],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Variables ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if variables.is_empty() {
        let paragraph = Paragraph::new("(no variables yet)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = variables
        .iter()
        .map(|(name, value)| {
            let name_style = if changed.contains(name) {
                Style::default()
                    .fg(DEFAULT_THEME.changed_value)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            ListItem::new(Line::from(vec![
                Span::styled(name.clone(), name_style),
                Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(value.inspect(), value_style(value)),
            ]))
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(items.len().saturating_sub(visible_height));

    let visible: Vec<ListItem> = items.into_iter().skip(*scroll_offset).take(visible_height).collect();
    frame.render_widget(List::new(visible).block(block.padding(Padding::new(1, 0, 0, 0))), area);
}
