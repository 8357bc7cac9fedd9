use crate::app::{App, Focus};
use crate::entity::EntityKind;
use crate::util::{fit_width, strip_control_chars};
use crate::view::{ActiveView, Phase, RelatedPanel};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

const SPINNER: [char; super::loop_runner::SPINNER_FRAMES] =
    ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the view selector with the mounted kind highlighted.
pub fn render_tabs(f: &mut Frame, selected: EntityKind, area: Rect) {
    let titles: Vec<Line> = EntityKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| Line::from(format!("{} {}", i + 1, kind.label())))
        .collect();
    let index = EntityKind::ALL
        .iter()
        .position(|kind| *kind == selected)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(index)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    f.render_widget(tabs, area);
}

/// Render the record list for the current page.
pub fn render_list(f: &mut Frame, app: &App, view: &ActiveView, area: Rect) {
    let is_focused = app.focus == Focus::List;
    let loading = view.phase() == Phase::Loading;
    let width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if view.is_empty() {
        let text = if loading {
            "Loading...".to_string()
        } else {
            format!("No {}", view.kind().label().to_lowercase())
        };
        vec![ListItem::new(text)]
    } else {
        view.rows()
            .into_iter()
            .map(|row| {
                let marker = if row.selected { "● " } else { "  " };
                let head = format!("{}#{} {}", marker, row.id, row.headline);

                let head_style = if row.under_cursor {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else if row.selected {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                let mut lines = vec![Line::from(Span::styled(
                    fit_width(&head, width).into_owned(),
                    head_style,
                ))];
                if view.row_height() > 1 {
                    let detail = format!("    {}", row.detail);
                    lines.push(Line::from(Span::styled(
                        fit_width(&detail, width).into_owned(),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let (page, pages) = view.page_position();
    let mut title = format!("{} ({})", view.kind().label(), view.len());
    if pages > 1 {
        title.push_str(&format!(" page {}/{}", page, pages));
    }
    if loading {
        title.push(' ');
        title.push(SPINNER[app.spinner_frame % SPINNER.len()]);
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    f.render_widget(list, area);
}

/// Render the related-items panel for the selected row.
pub fn render_related(f: &mut Frame, view: &ActiveView, label: &str, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;

    let (title, lines): (String, Vec<Line>) = match (view.selection(), view.related()) {
        (Some(id), Some(RelatedPanel::Loading)) => (
            format!("{} for #{}", label, id),
            vec![Line::from("Loading...")],
        ),
        (Some(id), Some(RelatedPanel::Failed(message))) => (
            format!("{} for #{}", label, id),
            vec![Line::from(Span::styled(
                fit_width(message, width).into_owned(),
                Style::default().fg(Color::Red),
            ))],
        ),
        (Some(id), Some(RelatedPanel::Loaded(items))) => {
            let lines = if items.is_empty() {
                vec![Line::from("Nothing here")]
            } else {
                items
                    .iter()
                    .map(|item| {
                        let text = format!("#{} {}", item.id, strip_control_chars(&item.title));
                        Line::from(fit_width(&text, width).into_owned())
                    })
                    .collect()
            };
            (format!("{} for #{} ({})", label, id, items.len()), lines)
        }
        _ => (
            label.to_string(),
            vec![Line::from(Span::styled(
                "Select a row to show its related records",
                Style::default().fg(Color::DarkGray),
            ))],
        ),
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title),
    );
    f.render_widget(paragraph, area);
}
