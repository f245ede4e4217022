//! Routing module
//!
//! Validates page request paths and extracts the action and page title.

mod pattern;

pub use pattern::{Action, RoutePattern};
