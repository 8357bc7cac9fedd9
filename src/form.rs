//! Form buffer shared by the entity views and the auth screen.
//!
//! A [`FormBuffer`] is a fixed, ordered set of named text fields. Every field
//! declared at construction always has a value; clearing sets values back to
//! empty strings rather than removing them.

use thiserror::Error;

/// One editable text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    /// Must be non-empty (after trimming) before a create or update is sent.
    pub required: bool,
    /// Rendered masked.
    pub secret: bool,
}

impl Field {
    pub const fn required(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: true,
            secret: false,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: false,
            secret: false,
        }
    }

    pub const fn secret(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: true,
            secret: true,
        }
    }
}

/// Validation failures raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are blank. Holds the joined labels.
    #[error("{0} cannot be empty")]
    Empty(String),

    /// Search by id or filter submitted with a blank input.
    #[error("Search input is empty")]
    EmptySearch,

    /// Filter search requested on an entity that has none.
    #[error("{0} cannot be filtered")]
    NoFilter(&'static str),

    /// Update target is no longer in the list.
    #[error("No {0} with id {1} in the list")]
    NotInList(&'static str, i64),

    /// Row operation with an empty list.
    #[error("Nothing selected")]
    NoRecord,
}

/// Join labels as "A", "A and B", "A, B and C".
fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[derive(Debug, Clone)]
pub struct FormBuffer {
    fields: Vec<Field>,
    values: Vec<String>,
    focus: usize,
}

impl FormBuffer {
    pub fn new(fields: Vec<Field>) -> Self {
        let values = vec![String::new(); fields.len()];
        Self {
            fields,
            values,
            focus: 0,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Current value of `name`; empty for unknown names.
    pub fn get(&self, name: &str) -> &str {
        self.index_of(name)
            .map(|i| self.values[i].as_str())
            .unwrap_or("")
    }

    /// Set `name` to `value`. Unknown names are ignored so the field set
    /// never grows after construction.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(i) = self.index_of(name) {
            self.values[i] = value.into();
        }
    }

    /// Empty every field and move focus back to the first one.
    pub fn clear(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        self.focus = 0;
    }

    pub fn is_clear(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &str)> {
        self.fields
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_field(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Move focus to `name` if it exists.
    pub fn focus_on(&mut self, name: &str) {
        if let Some(i) = self.index_of(name) {
            self.focus = i;
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(value) = self.values.get_mut(self.focus) {
            value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(value) = self.values.get_mut(self.focus) {
            value.pop();
        }
    }

    /// Check that every field in `names` that is marked required holds
    /// non-blank text.
    pub fn require(&self, names: &[&str]) -> Result<(), ValidationError> {
        let missing: Vec<&str> = self
            .iter()
            .filter(|(field, value)| {
                field.required && names.contains(&field.name) && value.trim().is_empty()
            })
            .map(|(field, _)| field.label)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Empty(join_labels(&missing)))
        }
    }

    /// Trimmed value of a search input, or [`ValidationError::EmptySearch`].
    pub fn search_input(&self, name: &str) -> Result<String, ValidationError> {
        let value = self.get(name).trim();
        if value.is_empty() {
            Err(ValidationError::EmptySearch)
        } else {
            Ok(value.to_string())
        }
    }
}
