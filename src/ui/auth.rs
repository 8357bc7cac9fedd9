use crate::app::App;
use crate::shell::AuthMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

/// Render the login or registration form centered in `area`.
pub fn render(f: &mut Frame, app: &App, mode: AuthMode, area: Rect) {
    let form = app.auth.active();
    let (title, switch) = match mode {
        AuthMode::Login => (" Log in ", "No account yet? Ctrl+r to register"),
        AuthMode::Register => (" Register ", "Have an account? Ctrl+r to log in"),
    };

    let height = form.fields().len() as u16 + 2;
    let width = 56u16.min(area.width.saturating_sub(4));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height + 3) / 2;
    let block = Rect::new(x, y, width, (height + 3).min(area.height));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(height),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(block);

    let heading = Paragraph::new("crudknut")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(heading, chunks[0]);

    super::form::render(f, form, true, title, chunks[1]);

    let hint = Paragraph::new(switch)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, chunks[2]);
}
