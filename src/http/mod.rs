//! HTTP protocol layer module
//!
//! Provides HTTP response builders, decoupled from the page handlers.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_400_response, build_404_response, build_413_response, build_500_response,
    build_redirect_response,
};
