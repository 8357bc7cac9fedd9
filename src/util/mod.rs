//! Text helpers shared by the views and the terminal renderer.
//!
//! - [`shorten`] applies the per-entity display limit to free-text fields
//! - [`fit_width`] fits rendered text into a panel's column budget
//! - [`strip_control_chars`] keeps server text from driving the terminal

mod text;

pub use text::{display_width, fit_width, shorten, strip_control_chars, ELLIPSIS};
