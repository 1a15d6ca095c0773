pub mod config;
pub(crate) mod settings;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
