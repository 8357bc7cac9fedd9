//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on the current screen and focus.

use crate::app::{App, AppEvent, Focus};
use crate::entity::EntityKind;
use crate::form::{FormBuffer, ValidationError};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::shell::Screen;
use crate::view::{Command, Pending, SEARCH_FIELD};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::spawn_request;
use super::Action;

/// Main input dispatch function.
///
/// Overlays capture keys first, then the screen decides.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Any key dismisses the alert
    if app.alert.is_some() {
        app.alert = None;
        return Ok(Action::Continue);
    }

    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    let action = match app.screen() {
        Screen::Auth(_) => handle_auth_input(app, code, modifiers, event_tx),
        Screen::Entity(_) => match app.focus {
            Focus::List => handle_list_input(app, code, modifiers, event_tx),
            Focus::Form => handle_form_input(app, code, modifiers, event_tx),
        },
    };
    Ok(action)
}

/// Spawn the request if the operation produced one.
fn dispatch(app: &App, pending: Option<Pending>, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(pending) = pending {
        spawn_request(&app.client, pending, event_tx);
    }
}

/// Type into the focused field.
fn edit_field(form: &mut FormBuffer, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return;
    }
    match code {
        KeyCode::Char(c) => form.push_char(c),
        KeyCode::Backspace => form.pop_char(),
        _ => {}
    }
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_auth_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Auth)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NextField) => app.auth.active_mut().focus_next(),
        Some(KbAction::PrevField) => app.auth.active_mut().focus_prev(),
        Some(KbAction::ToggleAuthMode) => app.toggle_auth_mode(),
        Some(KbAction::Submit) => {
            let pending = app.submit_auth();
            dispatch(app, pending, event_tx);
        }
        _ => edit_field(app.auth.active_mut(), code, modifiers),
    }
    Action::Continue
}

fn handle_list_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::List)
    else {
        return Action::Continue;
    };

    let pending = match action {
        KbAction::Quit => return Action::Quit,
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
            None
        }
        KbAction::NavDown => move_cursor(app, 1),
        KbAction::NavUp => move_cursor(app, -1),
        KbAction::PageDown => move_page(app, 1),
        KbAction::PageUp => move_page(app, -1),
        KbAction::FocusForm => {
            app.focus = Focus::Form;
            None
        }
        KbAction::FocusSearch => {
            focus_field(app, SEARCH_FIELD);
            None
        }
        KbAction::FocusFilter => {
            let filter = app
                .active
                .as_ref()
                .map(|view| (view.kind(), view.filter_key()));
            match filter {
                Some((_, Some(key))) => focus_field(app, key),
                Some((kind, None)) => {
                    app.set_status(ValidationError::NoFilter(kind.label()).to_string())
                }
                None => {}
            }
            None
        }
        KbAction::ToggleSelection => app.run_command(Command::ToggleSelection),
        KbAction::EditRecord => {
            app.edit_row();
            None
        }
        KbAction::DeleteRecord => app.run_command(Command::Delete),
        KbAction::Reload => app.run_command(Command::Reload),
        KbAction::SelectPosts => app.select_entity(EntityKind::Posts),
        KbAction::SelectComments => app.select_entity(EntityKind::Comments),
        KbAction::SelectAlbums => app.select_entity(EntityKind::Albums),
        KbAction::SelectUsers => app.select_entity(EntityKind::Users),
        KbAction::Logout => {
            app.logout();
            None
        }
        _ => None,
    };

    dispatch(app, pending, event_tx);
    Action::Continue
}

fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let Some(view) = app.active.as_mut() else {
        app.focus = Focus::List;
        return Action::Continue;
    };

    let pending = match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Form)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NextField) => {
            view.form_mut().focus_next();
            None
        }
        Some(KbAction::PrevField) => {
            view.form_mut().focus_prev();
            None
        }
        Some(KbAction::FocusList) => {
            app.focus = Focus::List;
            None
        }
        Some(KbAction::Submit) => {
            let focused = view.form().focused_field().map(|f| f.name);
            let command = if focused == Some(SEARCH_FIELD) {
                Command::SearchById
            } else if focused.is_some() && focused == view.filter_key() {
                Command::SearchByFilter
            } else {
                Command::Create
            };
            app.run_command(command)
        }
        Some(KbAction::UpdateRecord) => app.run_command(Command::Update),
        Some(KbAction::ResetForm) => app.run_command(Command::ResetForm),
        _ => {
            edit_field(view.form_mut(), code, modifiers);
            None
        }
    };

    dispatch(app, pending, event_tx);
    Action::Continue
}

fn move_cursor(app: &mut App, delta: isize) -> Option<Pending> {
    if let Some(view) = app.active.as_mut() {
        view.move_cursor(delta);
    }
    None
}

fn move_page(app: &mut App, pages: isize) -> Option<Pending> {
    if let Some(view) = app.active.as_mut() {
        view.move_page(pages);
    }
    None
}

fn focus_field(app: &mut App, name: &str) {
    if let Some(view) = app.active.as_mut() {
        view.form_mut().focus_on(name);
        app.focus = Focus::Form;
    }
}
