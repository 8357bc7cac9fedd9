//! Remote resource client for the JSONPlaceholder REST API.
//!
//! One [`ResourceClient`] serves every collection. Calls return parsed JSON
//! or an [`ApiError`]; there is no retry policy, and the caller decides how a
//! failure is shown.

mod client;

pub use client::{ApiError, ResourceClient};

/// Public mock API the client talks to unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
