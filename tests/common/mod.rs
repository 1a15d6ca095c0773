//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod forge;

pub use self::fixtures::{cargo_test_log, sample_forge, test_settings, REPO_URL};
pub use self::forge::{job, FakeForge, FakeJob};
