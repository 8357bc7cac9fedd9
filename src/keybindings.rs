//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are looked up per context. The list context falls back to
//! [`Context::Global`]; the form and auth contexts do not, so plain
//! characters typed there always reach the focused field.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    NextField,
    PrevField,
    FocusForm,
    FocusList,
    FocusSearch,
    FocusFilter,
    Submit,
    ToggleSelection,
    EditRecord,
    UpdateRecord,
    DeleteRecord,
    Reload,
    ResetForm,
    SelectPosts,
    SelectComments,
    SelectAlbums,
    SelectUsers,
    Logout,
    ToggleAuthMode,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::PageDown => "Next page",
            Self::PageUp => "Previous page",
            Self::NextField => "Next field",
            Self::PrevField => "Previous field",
            Self::FocusForm => "Focus the form",
            Self::FocusList => "Back to the list",
            Self::FocusSearch => "Search by id",
            Self::FocusFilter => "Search by owner",
            Self::Submit => "Create record / run search",
            Self::ToggleSelection => "Expand or collapse row",
            Self::EditRecord => "Copy row into form",
            Self::UpdateRecord => "Update row from form",
            Self::DeleteRecord => "Delete row",
            Self::Reload => "Reload list",
            Self::ResetForm => "Clear the form",
            Self::SelectPosts => "Show posts",
            Self::SelectComments => "Show comments",
            Self::SelectAlbums => "Show albums",
            Self::SelectUsers => "Show users",
            Self::Logout => "Log out",
            Self::ToggleAuthMode => "Switch login / register",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    List,
    Form,
    Auth,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::List => "List",
            Self::Form => "Form",
            Self::Auth => "Login",
        }
    }

    /// Whether lookups here fall back to [`Context::Global`].
    fn inherits_global(self) -> bool {
        matches!(self, Self::List)
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Key as delivered by the terminal. Shift is already folded into
    /// upper-case chars and `BackTab`, so it is dropped there.
    pub fn from_event(code: KeyCode, modifiers: KeyModifiers) -> Self {
        match code {
            KeyCode::Char(_) | KeyCode::BackTab => {
                Self::new(code, modifiers.difference(KeyModifiers::SHIFT))
            }
            _ => Self::new(code, modifiers),
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "BackTab", "Up", "Down", "PageUp", ...
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let rest = rest.trim();
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    // Named keys (case-insensitive)
    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "backtab" | "shift+tab" => return Some(KeySpec::plain(KeyCode::BackTab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "pageup" | "pgup" => return Some(KeySpec::plain(KeyCode::PageUp)),
        "pagedown" | "pgdn" => return Some(KeySpec::plain(KeyCode::PageDown)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "delete" | "del" => return Some(KeySpec::plain(KeyCode::Delete)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = n.parse::<u8>() {
            if (1..=12).contains(&n) {
                return Some(KeySpec::plain(KeyCode::F(n)));
            }
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Context::{Auth, Form, Global, List};
        use KeyCode::*;

        // === Global (reached from the list) ===
        self.bind(Global, KeySpec::plain(Char('q')), Action::Quit);
        self.bind(Global, KeySpec::ctrl('c'), Action::Quit);
        self.bind(Global, KeySpec::plain(Char('?')), Action::ShowHelp);
        self.bind(Global, KeySpec::plain(Char('1')), Action::SelectPosts);
        self.bind(Global, KeySpec::plain(Char('2')), Action::SelectComments);
        self.bind(Global, KeySpec::plain(Char('3')), Action::SelectAlbums);
        self.bind(Global, KeySpec::plain(Char('4')), Action::SelectUsers);
        self.bind(Global, KeySpec::plain(Char('L')), Action::Logout);

        // === List ===
        self.bind(List, KeySpec::plain(Char('j')), Action::NavDown);
        self.bind(List, KeySpec::plain(Down), Action::NavDown);
        self.bind(List, KeySpec::plain(Char('k')), Action::NavUp);
        self.bind(List, KeySpec::plain(Up), Action::NavUp);
        self.bind(List, KeySpec::plain(PageDown), Action::PageDown);
        self.bind(List, KeySpec::ctrl('d'), Action::PageDown);
        self.bind(List, KeySpec::plain(PageUp), Action::PageUp);
        self.bind(List, KeySpec::ctrl('u'), Action::PageUp);
        self.bind(List, KeySpec::plain(Tab), Action::FocusForm);
        self.bind(List, KeySpec::plain(Char('i')), Action::FocusForm);
        self.bind(List, KeySpec::plain(Char('/')), Action::FocusSearch);
        self.bind(List, KeySpec::plain(Char('f')), Action::FocusFilter);
        self.bind(List, KeySpec::plain(Enter), Action::ToggleSelection);
        self.bind(List, KeySpec::plain(Char(' ')), Action::ToggleSelection);
        self.bind(List, KeySpec::plain(Char('e')), Action::EditRecord);
        self.bind(List, KeySpec::plain(Char('d')), Action::DeleteRecord);
        self.bind(List, KeySpec::plain(Char('r')), Action::Reload);

        // === Form ===
        self.bind(Form, KeySpec::plain(Tab), Action::NextField);
        self.bind(Form, KeySpec::plain(Down), Action::NextField);
        self.bind(Form, KeySpec::plain(BackTab), Action::PrevField);
        self.bind(Form, KeySpec::plain(Up), Action::PrevField);
        self.bind(Form, KeySpec::plain(Esc), Action::FocusList);
        self.bind(Form, KeySpec::plain(Enter), Action::Submit);
        self.bind(Form, KeySpec::ctrl('u'), Action::UpdateRecord);
        self.bind(Form, KeySpec::ctrl('r'), Action::ResetForm);
        self.bind(Form, KeySpec::ctrl('c'), Action::Quit);

        // === Auth ===
        self.bind(Auth, KeySpec::plain(Tab), Action::NextField);
        self.bind(Auth, KeySpec::plain(Down), Action::NextField);
        self.bind(Auth, KeySpec::plain(BackTab), Action::PrevField);
        self.bind(Auth, KeySpec::plain(Up), Action::PrevField);
        self.bind(Auth, KeySpec::plain(Enter), Action::Submit);
        self.bind(Auth, KeySpec::ctrl('r'), Action::ToggleAuthMode);
        self.bind(Auth, KeySpec::plain(Esc), Action::Quit);
        self.bind(Auth, KeySpec::ctrl('c'), Action::Quit);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "nav_down").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Re-bind in every context the action had, with the new key.
            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then Global where the context
    /// inherits it.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::from_event(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context.inherits_global() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "page_down" | "pagedown" => Some(Action::PageDown),
        "page_up" | "pageup" => Some(Action::PageUp),
        "next_field" | "nextfield" => Some(Action::NextField),
        "prev_field" | "prevfield" => Some(Action::PrevField),
        "focus_form" | "focusform" | "form" => Some(Action::FocusForm),
        "focus_list" | "focuslist" | "list" => Some(Action::FocusList),
        "focus_search" | "focussearch" | "search" => Some(Action::FocusSearch),
        "focus_filter" | "focusfilter" | "filter" => Some(Action::FocusFilter),
        "submit" | "create" => Some(Action::Submit),
        "toggle_selection" | "toggleselection" | "toggle" | "expand" => {
            Some(Action::ToggleSelection)
        }
        "edit_record" | "editrecord" | "edit" => Some(Action::EditRecord),
        "update_record" | "updaterecord" | "update" => Some(Action::UpdateRecord),
        "delete_record" | "deleterecord" | "delete" => Some(Action::DeleteRecord),
        "reload" | "refresh" => Some(Action::Reload),
        "reset_form" | "resetform" | "reset" => Some(Action::ResetForm),
        "select_posts" | "posts" => Some(Action::SelectPosts),
        "select_comments" | "comments" => Some(Action::SelectComments),
        "select_albums" | "albums" => Some(Action::SelectAlbums),
        "select_users" | "users" => Some(Action::SelectUsers),
        "logout" => Some(Action::Logout),
        "toggle_auth_mode" | "toggleauthmode" | "register" => Some(Action::ToggleAuthMode),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
