//! Page persistence
//!
//! Loads and saves page bodies as flat files keyed by title.

mod page;

pub use page::{Page, PageStore, StoreError};
