use crate::app::{App, Focus};
use crate::shell::{AuthMode, Screen};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        Cow::Borrowed(hint(app))
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}

/// Static keybinding hints for the current screen and focus.
fn hint(app: &App) -> &'static str {
    match app.screen() {
        Screen::Auth(AuthMode::Login) => "[Tab]next field [Enter]log in [Ctrl+r]register [Esc]quit",
        Screen::Auth(AuthMode::Register) => {
            "[Tab]next field [Enter]register [Ctrl+r]back to login [Esc]quit"
        }
        Screen::Entity(_) => match app.focus {
            Focus::List => {
                "[1-4]views [j/k]move [Enter]select [e]dit [d]elete [/]search [f]ilter [r]eload [?]help [q]uit"
            }
            Focus::Form => {
                "[Enter]create/search [Ctrl+u]update [Ctrl+r]reset [Tab]next field [Esc]list"
            }
        },
    }
}
