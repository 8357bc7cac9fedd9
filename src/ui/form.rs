use crate::form::FormBuffer;
use crate::util::fit_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render a form panel. The focused field gets a cursor when `is_focused`.
pub fn render(f: &mut Frame, form: &FormBuffer, is_focused: bool, title: &str, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let label_width = form
        .fields()
        .iter()
        .map(|field| field.label.len())
        .max()
        .unwrap_or(0);
    // borders, ": " and the cursor
    let value_width = (area.width as usize).saturating_sub(label_width + 5);

    let lines: Vec<Line> = form
        .iter()
        .enumerate()
        .map(|(i, (field, value))| {
            let active = is_focused && i == form.focus();
            let shown = if field.secret {
                "*".repeat(value.chars().count())
            } else {
                value.to_string()
            };
            let marker = if field.required { "" } else { "?" };

            let label_style = if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };

            let mut spans = vec![
                Span::styled(
                    format!("{:>width$}{}", field.label, marker, width = label_width),
                    label_style,
                ),
                Span::raw(": "),
                Span::raw(fit_width(&shown, value_width).into_owned()),
            ];
            if active {
                spans.push(Span::styled(
                    "_",
                    Style::default().add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title.to_string()),
    );

    f.render_widget(paragraph, area);
}
