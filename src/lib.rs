//! Terminal CRUD client for the JSONPlaceholder REST API.
//!
//! Posts, comments, albums and users are listed, searched, created, updated
//! and deleted against a remote collection. A local session store gates the
//! entity screens behind login.

pub mod api;
pub mod app;
pub mod config;
pub mod entity;
pub mod form;
pub mod keybindings;
pub mod session;
pub mod shell;
pub mod ui;
pub mod util;
pub mod view;
