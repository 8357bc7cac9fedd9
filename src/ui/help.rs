//! Help overlay: every binding, one line per action.
//!
//! Keys bound to the same action within a context share a line, so the
//! overlay reads "j, Down  Navigate down" rather than listing each key.
//! Overrides from the config show up here as they are applied.

use crate::app::App;
use crate::keybindings::{Action, Context, KeybindingRegistry};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Sections in the order they are listed.
const SECTIONS: [Context; 4] = [Context::List, Context::Global, Context::Form, Context::Auth];

/// One action and the keys that trigger it.
#[derive(Debug, PartialEq)]
struct Entry {
    keys: String,
    description: &'static str,
}

/// Bindings of `context`, merged per action in registration order.
fn entries(registry: &KeybindingRegistry, context: Context) -> Vec<Entry> {
    let mut merged: Vec<(Action, Vec<String>)> = Vec::new();
    for (ctx, key, action, _) in registry.all_bindings() {
        if ctx != context {
            continue;
        }
        match merged.iter_mut().find(|(a, _)| *a == action) {
            Some((_, keys)) => keys.push(key),
            None => merged.push((action, vec![key])),
        }
    }
    merged
        .into_iter()
        .map(|(action, keys)| Entry {
            keys: keys.join(", "),
            description: action.describe(),
        })
        .collect()
}

fn help_lines(registry: &KeybindingRegistry) -> Vec<Line<'static>> {
    let sections: Vec<(Context, Vec<Entry>)> = SECTIONS
        .iter()
        .map(|ctx| (*ctx, entries(registry, *ctx)))
        .filter(|(_, entries)| !entries.is_empty())
        .collect();

    let key_width = sections
        .iter()
        .flat_map(|(_, entries)| entries.iter().map(|e| e.keys.chars().count()))
        .max()
        .unwrap_or(0);

    let heading = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(Color::Yellow);

    let mut lines = Vec::new();
    for (ctx, entries) in sections {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(ctx.label(), heading)));
        for entry in entries {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<width$}  ", entry.keys, width = key_width),
                    key_style,
                ),
                Span::raw(entry.description),
            ]));
        }
    }
    lines
}

/// Render the help overlay on top of the current screen.
pub fn render(f: &mut Frame, app: &App) {
    let lines = help_lines(&app.keybindings);

    let area = f.area();
    let width = 64u16.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let visible = overlay.height.saturating_sub(2) as usize;
    let total = lines.len();
    let max_scroll = total.saturating_sub(visible);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Keys {}-{} of {} ", scroll + 1, scroll + visible, total)
    } else {
        " Keys ".to_string()
    };
    let hint = if max_scroll > 0 {
        " j/k scroll, ? or Esc close "
    } else {
        " ? or Esc close "
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title)
                .title_bottom(Line::from(hint).style(Style::default().fg(Color::DarkGray))),
        )
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));

    f.render_widget(Clear, overlay);
    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ResourceClient, DEFAULT_BASE_URL};
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};
    use std::collections::HashMap;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_keys_for_one_action_share_a_line() {
        let registry = KeybindingRegistry::new();
        let list = entries(&registry, Context::List);
        assert_eq!(
            list[0],
            Entry {
                keys: "j, Down".into(),
                description: "Navigate down",
            }
        );
        assert!(list
            .iter()
            .any(|e| e.keys == "Enter, Space" && e.description == "Expand or collapse row"));
        assert_eq!(
            list.iter()
                .filter(|e| e.description == "Navigate down")
                .count(),
            1
        );
    }

    #[test]
    fn test_override_shows_in_help() {
        let mut registry = KeybindingRegistry::new();
        let overrides = HashMap::from([("reload".to_string(), "F5".to_string())]);
        assert!(registry.apply_overrides(&overrides).is_empty());

        let list = entries(&registry, Context::List);
        let reload = list
            .iter()
            .find(|e| e.description == "Reload list")
            .unwrap();
        assert!(reload.keys.contains("F5"));
    }

    #[test]
    fn test_render_scrolls_and_clamps() {
        let client = ResourceClient::new(DEFAULT_BASE_URL, None).unwrap();
        let mut app = App::new(client, &Config::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();

        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Keys 1-"));
        assert!(text.contains("j, Down"));

        app.help_scroll_offset = 1000;
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(!text.contains("j, Down"));
        assert!(text.contains("Switch login / register"));
    }
}
