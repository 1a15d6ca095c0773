//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality:
//! - Grader settings and their layered loading
//! - Configuration constants shared by the commands

// Settings
pub use super::settings::{default_config_path, AuditSettings};

// Defaults and conventions
pub use super::config::{
    DEFAULT_GITLAB_URL, ENV_GITLAB_URL, ENV_PRIVATE_TOKEN, RESULTS_FILE_NAME,
};
