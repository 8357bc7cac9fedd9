use crate::api::ResourceClient;
use crate::config::Config;
use crate::entity::EntityKind;
use crate::form::{Field, FormBuffer};
use crate::keybindings::KeybindingRegistry;
use crate::session::{Registration, SessionStore};
use crate::shell::{self, AuthMode, Screen, Shell};
use crate::view::{ActiveView, Applied, Command, Delivery, Pending, Ticket};
use secrecy::SecretString;
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Events
// ============================================================================

/// Messages from background tasks to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A request finished; the outcome is tagged with the issuing view.
    Delivered(Delivery),
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the operation that panicked (e.g., "load", "create")
    /// - `ticket`: The ticket the request was issued under
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        ticket: Ticket,
        error: String,
    },
}

// ============================================================================
// UI State Types
// ============================================================================

/// Which panel of the entity screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Form,
}

/// Login and registration forms. Both keep their contents while the other
/// one is shown.
#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    login: FormBuffer,
    register: FormBuffer,
}

impl AuthForm {
    fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            login: FormBuffer::new(vec![
                Field::required("login", "Login"),
                Field::secret("password", "Password"),
            ]),
            register: FormBuffer::new(vec![
                Field::required("login", "Login"),
                Field::required("email", "Email"),
                Field::secret("password", "Password"),
                Field::secret("confirmPassword", "Confirm password"),
            ]),
        }
    }

    pub fn active(&self) -> &FormBuffer {
        match self.mode {
            AuthMode::Login => &self.login,
            AuthMode::Register => &self.register,
        }
    }

    pub fn active_mut(&mut self) -> &mut FormBuffer {
        match self.mode {
            AuthMode::Login => &mut self.login,
            AuthMode::Register => &mut self.register,
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: ResourceClient,
    pub keybindings: KeybindingRegistry,

    pub session: SessionStore,
    pub shell: Shell,
    pub auth: AuthForm,

    /// Mounted entity view; `None` while logged out.
    pub active: Option<ActiveView>,
    pub focus: Focus,

    /// Status bar message with the time it was set.
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub status_timeout: Duration,

    /// Blocking error overlay for transport failures; any key dismisses it.
    pub alert: Option<String>,

    pub show_help: bool,
    pub help_scroll_offset: usize,

    /// Loading indicator frame, advanced on each tick while a list loads.
    pub spinner_frame: usize,

    /// Only render when state has changed.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(client: ResourceClient, config: &Config) -> Self {
        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!(%warning, "Keybinding override ignored");
        }

        Self {
            client,
            keybindings,
            session: SessionStore::new(),
            shell: Shell::new(config.start_kind()),
            auth: AuthForm::new(),
            active: None,
            focus: Focus::List,
            status_message: None,
            status_timeout: config.status_timeout(),
            alert: None,
            show_help: false,
            help_scroll_offset: 0,
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    pub fn screen(&self) -> Screen {
        shell::screen(
            self.session.is_authenticated(),
            self.shell.selected(),
            self.auth.mode,
        )
    }

    /// Id of the logged-in account, used as the author of new records.
    pub fn author(&self) -> Option<i64> {
        self.session.current().map(|account| account.id)
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub fn toggle_auth_mode(&mut self) {
        self.auth.mode = self.auth.mode.toggled();
    }

    /// Submit the visible auth form. A successful login mounts the selected
    /// entity view and returns its initial load.
    pub fn submit_auth(&mut self) -> Option<Pending> {
        match self.auth.mode {
            AuthMode::Login => self.submit_login(),
            AuthMode::Register => {
                self.submit_register();
                None
            }
        }
    }

    fn submit_login(&mut self) -> Option<Pending> {
        let form = &self.auth.login;
        let result = self
            .session
            .login(form.get("login"), form.get("password"))
            .map(|account| account.login.clone());

        match result {
            Ok(login) => {
                self.auth.login.clear();
                self.set_status(format!("Logged in as {}", login));
                let mount = self.shell.remount();
                Some(self.mount(self.shell.selected(), mount))
            }
            Err(e) => {
                self.auth.login.set("password", "");
                self.set_status(e.to_string());
                None
            }
        }
    }

    fn submit_register(&mut self) {
        let form = &self.auth.register;
        let candidate = Registration {
            login: form.get("login").to_string(),
            email: form.get("email").to_string(),
            password: SecretString::from(form.get("password")),
            confirm_password: SecretString::from(form.get("confirmPassword")),
        };

        match self.session.register(candidate) {
            Ok(account) => {
                let login = account.login.clone();
                self.auth.register.clear();
                self.auth.mode = AuthMode::Login;
                self.auth.login.set("login", login.as_str());
                self.auth.login.focus_on("password");
                self.set_status(format!("Registered {}, you can log in now", login));
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Drop the mounted view and go back to the login screen.
    pub fn logout(&mut self) {
        self.session.logout();
        self.active = None;
        self.focus = Focus::List;
        self.auth.mode = AuthMode::Login;
        self.set_status("Logged out");
    }

    // ========================================================================
    // Entity views
    // ========================================================================

    /// Switch to `kind`. Selecting the kind already shown does nothing.
    pub fn select_entity(&mut self, kind: EntityKind) -> Option<Pending> {
        if !self.session.is_authenticated() {
            return None;
        }
        let mount = self.shell.select(kind, self.active.is_some())?;
        Some(self.mount(kind, mount))
    }

    fn mount(&mut self, kind: EntityKind, mount: u64) -> Pending {
        tracing::debug!(%kind, mount, "Mounting entity view");
        let mut view = ActiveView::mount(kind, mount);
        let pending = view.start();
        self.active = Some(view);
        self.focus = Focus::List;
        pending
    }

    /// Prepare `command` on the mounted view. Validation failures go to the
    /// status bar and nothing is sent.
    pub fn run_command(&mut self, command: Command) -> Option<Pending> {
        let author = self.author();
        let view = self.active.as_mut()?;
        match view.run(command, author) {
            Ok(pending) => pending,
            Err(e) => {
                self.set_status(e.to_string());
                None
            }
        }
    }

    /// Copy the cursor row into the form and move focus there.
    pub fn edit_row(&mut self) {
        let Some(view) = self.active.as_mut() else {
            return;
        };
        match view.run(Command::EditRow, None) {
            Ok(_) => self.focus = Focus::Form,
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Apply a finished request to the mounted view and report the result.
    pub fn apply_delivery(&mut self, delivery: Delivery) {
        let Some(view) = self.active.as_mut() else {
            tracing::debug!("Dropping delivery, no view mounted");
            return;
        };

        match view.apply(delivery) {
            Applied::Done(message) => self.set_status(message),
            Applied::Stale => {
                tracing::debug!(kind = %view.kind(), "Ignoring stale response");
            }
            Applied::Failed {
                message,
                transport: true,
            } => {
                tracing::warn!(error = %message, "Transport failure");
                self.alert = Some(message);
            }
            Applied::Failed {
                message,
                transport: false,
            } => {
                tracing::warn!(error = %message, "Request rejected");
                self.set_status(message);
            }
        }
    }

    /// A request task died without a reply. Report it and stop waiting on it.
    pub fn task_panicked(&mut self, task: &'static str, ticket: Ticket, error: &str) {
        tracing::error!(task, error = %error, "Background task panicked");
        if let Some(view) = self.active.as_mut() {
            view.settle(ticket);
        }
        self.set_status(format!("Internal error in {} task", task));
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= self.status_timeout {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, DEFAULT_BASE_URL};
    use crate::entity::Post;
    use crate::view::{Completion, Outcome, Phase, Ticket};
    use pretty_assertions::assert_eq;

    fn app() -> App {
        let client = ResourceClient::new(DEFAULT_BASE_URL, None).unwrap();
        App::new(client, &Config::default())
    }

    fn register_and_login(app: &mut App) -> Option<Pending> {
        app.toggle_auth_mode();
        let form = app.auth.active_mut();
        form.set("login", "ann");
        form.set("email", "ann@example.com");
        form.set("password", "pw");
        form.set("confirmPassword", "pw");
        assert!(app.submit_auth().is_none());
        assert_eq!(app.auth.mode, AuthMode::Login);

        app.auth.active_mut().set("password", "pw");
        app.submit_auth()
    }

    #[test]
    fn test_starts_on_login_screen() {
        let app = app();
        assert_eq!(app.screen(), Screen::Auth(AuthMode::Login));
        assert!(app.active.is_none());
    }

    #[test]
    fn test_login_mounts_start_view() {
        let mut app = app();
        let pending = register_and_login(&mut app).unwrap();
        assert_eq!(pending.kind(), EntityKind::Posts);
        assert_eq!(pending.name(), "load");
        assert_eq!(app.screen(), Screen::Entity(EntityKind::Posts));
        assert_eq!(app.author(), Some(1));
    }

    #[test]
    fn test_failed_login_stays_on_auth() {
        let mut app = app();
        let form = app.auth.active_mut();
        form.set("login", "ghost");
        form.set("password", "x");
        assert!(app.submit_auth().is_none());
        assert_eq!(app.screen(), Screen::Auth(AuthMode::Login));
        assert_eq!(
            app.status_message.as_ref().map(|(m, _)| &**m),
            Some("Invalid login or password")
        );
    }

    #[test]
    fn test_select_same_kind_keeps_view() {
        let mut app = app();
        register_and_login(&mut app);
        let mount = app.active.as_ref().unwrap().mount_id();

        assert!(app.select_entity(EntityKind::Posts).is_none());
        assert_eq!(app.active.as_ref().unwrap().mount_id(), mount);

        let pending = app.select_entity(EntityKind::Users).unwrap();
        assert_eq!(pending.kind(), EntityKind::Users);
        assert_ne!(app.active.as_ref().unwrap().mount_id(), mount);
    }

    #[test]
    fn test_select_while_logged_out_is_ignored() {
        let mut app = app();
        assert!(app.select_entity(EntityKind::Albums).is_none());
        assert_eq!(app.screen(), Screen::Auth(AuthMode::Login));
    }

    #[test]
    fn test_logout_unmounts() {
        let mut app = app();
        register_and_login(&mut app);
        app.logout();
        assert!(app.active.is_none());
        assert_eq!(app.screen(), Screen::Auth(AuthMode::Login));
    }

    #[test]
    fn test_validation_error_goes_to_status() {
        let mut app = app();
        register_and_login(&mut app);
        assert!(app.run_command(Command::Create).is_none());
        assert_eq!(
            app.status_message.as_ref().map(|(m, _)| &**m),
            Some("Title and Body cannot be empty")
        );
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_transport_failure_raises_alert() {
        let mut app = app();
        register_and_login(&mut app);
        let mount = app.active.as_ref().unwrap().mount_id();

        app.apply_delivery(Delivery::Posts(Completion::<Post> {
            ticket: Ticket {
                mount,
                generation: 1,
            },
            outcome: Outcome::Loaded(Err(ApiError::Timeout)),
        }));
        assert_eq!(app.alert.as_deref(), Some("Request failed: timed out"));
    }

    #[test]
    fn test_http_status_failure_goes_to_status() {
        let mut app = app();
        register_and_login(&mut app);
        let mount = app.active.as_ref().unwrap().mount_id();

        app.apply_delivery(Delivery::Posts(Completion::<Post> {
            ticket: Ticket {
                mount,
                generation: 1,
            },
            outcome: Outcome::Loaded(Err(ApiError::HttpStatus(404))),
        }));
        assert!(app.alert.is_none());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_panicked_load_stops_loading() {
        let mut app = app();
        let pending = register_and_login(&mut app).unwrap();
        assert_eq!(app.active.as_ref().unwrap().phase(), Phase::Loading);

        app.task_panicked("load", pending.ticket(), "boom");
        assert_eq!(app.active.as_ref().unwrap().phase(), Phase::Idle);
        assert_eq!(
            app.status_message.as_ref().map(|(m, _)| &**m),
            Some("Internal error in load task")
        );
    }

    #[test]
    fn test_panic_from_superseded_load_keeps_loading() {
        let mut app = app();
        let first = register_and_login(&mut app).unwrap();
        assert!(app.run_command(Command::Reload).is_some());

        app.task_panicked("load", first.ticket(), "boom");
        assert_eq!(app.active.as_ref().unwrap().phase(), Phase::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_expires() {
        let mut app = app();
        app.set_status("hello");
        assert!(!app.clear_expired_status());
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
