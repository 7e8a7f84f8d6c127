//! HTTP request handlers

pub mod duplicate_check;
pub mod status;

// Re-export AppState (used by all handlers)
pub use status::AppState;
