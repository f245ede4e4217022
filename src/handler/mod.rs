//! Request handler module
//!
//! Request routing dispatch, path validation in front of the page
//! actions, and the view/edit/save actions themselves.

pub mod dispatch;
pub mod pages;
pub mod request;
pub mod router;

// Re-export main entry point
pub use dispatch::PageRoutes;
pub use router::handle_request;
