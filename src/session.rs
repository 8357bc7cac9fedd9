//! In-memory account registry and the current login.
//!
//! Accounts live for the lifetime of the process. Passwords are compared in
//! plain text but held as [`SecretString`] so they never show up in `Debug`
//! output or logs.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A registration field was blank.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Login already taken")]
    DuplicateLogin,

    #[error("Email already registered")]
    DuplicateEmail,

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid login or password")]
    InvalidCredentials,
}

/// A locally registered account.
#[derive(Debug)]
pub struct Account {
    pub id: i64,
    pub login: String,
    pub email: String,
    password: SecretString,
}

/// Registration form contents.
#[derive(Debug)]
pub struct Registration {
    pub login: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    accounts: Vec<Account>,
    current: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. Checks run in order: blank fields, login taken,
    /// email taken, password confirmation.
    ///
    /// The blank-field check is stricter than the signup form it mirrors,
    /// which accepts empty values; only the last three are core rules.
    pub fn register(&mut self, candidate: Registration) -> Result<&Account, SessionError> {
        if candidate.login.trim().is_empty() {
            return Err(SessionError::EmptyField("Login"));
        }
        if candidate.email.trim().is_empty() {
            return Err(SessionError::EmptyField("Email"));
        }
        if candidate.password.expose_secret().is_empty() {
            return Err(SessionError::EmptyField("Password"));
        }
        if self.accounts.iter().any(|a| a.login == candidate.login) {
            return Err(SessionError::DuplicateLogin);
        }
        if self.accounts.iter().any(|a| a.email == candidate.email) {
            return Err(SessionError::DuplicateEmail);
        }
        if candidate.password.expose_secret() != candidate.confirm_password.expose_secret() {
            return Err(SessionError::PasswordMismatch);
        }

        let id = self.accounts.len() as i64 + 1;
        tracing::info!(id, login = %candidate.login, "Registered account");
        self.accounts.push(Account {
            id,
            login: candidate.login,
            email: candidate.email,
            password: candidate.password,
        });
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    /// Log in with an exact login/password pair. A failed attempt leaves
    /// any previous session untouched.
    pub fn login(&mut self, login: &str, password: &str) -> Result<&Account, SessionError> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.login == login && a.password.expose_secret() == password)
            .ok_or(SessionError::InvalidCredentials)?;
        self.current = Some(index);
        tracing::info!(id = self.accounts[index].id, "Logged in");
        Ok(&self.accounts[index])
    }

    pub fn logout(&mut self) {
        if let Some(account) = self.current() {
            tracing::info!(id = account.id, "Logged out");
        }
        self.current = None;
    }

    pub fn current(&self) -> Option<&Account> {
        self.current.and_then(|i| self.accounts.get(i))
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }
}
