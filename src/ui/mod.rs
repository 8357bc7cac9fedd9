//! Terminal User Interface module.
//!
//! This module provides the TUI for the CRUD client, including:
//! - Main event loop (`run`)
//! - Input handling for the login screen, record lists and forms
//! - Rendering for tabs, lists, related panels and forms
//! - Background request completion handling
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Screen rendering dispatch
//! - `helpers` - Request spawning and panic capture
//! - `auth` - Login and registration screen
//! - `entities` - Tabs, record list and related panel widgets
//! - `form` - Form panel widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod auth;
mod entities;
mod events;
mod form;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
