//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! screen based on application state.

use crate::app::{App, Focus};
use crate::entity::EntityKind;
use crate::shell::Screen;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{auth, entities, form, help, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Main render dispatch function.
///
/// Routes to the login or entity screen, then draws overlays on top.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.screen() {
        Screen::Auth(mode) => auth::render(f, app, mode, chunks[0]),
        Screen::Entity(kind) => render_entity(f, app, kind, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    if app.show_help {
        help::render(f, app);
    }

    if let Some(message) = &app.alert {
        render_alert(f, message);
    }
}

/// Tabs on top, list (plus related panel) on the left, form on the right.
fn render_entity(f: &mut Frame, app: &mut App, kind: EntityKind, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    entities::render_tabs(f, kind, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1]);

    let related = app.active.as_ref().and_then(|view| view.related_label());
    let left = match related {
        Some(_) => Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]),
        None => Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0)])
            .split(columns[0]),
    };

    // Page size follows the list's inner height
    if let Some(view) = app.active.as_mut() {
        view.resize(left[0].height.saturating_sub(2));
    }

    let Some(view) = app.active.as_ref() else {
        return;
    };

    entities::render_list(f, app, view, left[0]);
    if let Some(label) = related {
        entities::render_related(f, view, label, left[1]);
    }

    let title = format!(" Edit {} ", view.kind().noun());
    form::render(f, view.form(), app.focus == Focus::Form, &title, columns[1]);
}

/// Blocking error box; any key dismisses it.
fn render_alert(f: &mut Frame, message: &str) {
    let area = f.area();

    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 7u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let text = format!("{}\n\nPress any key", message);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, overlay);
}
