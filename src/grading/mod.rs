//! Grading building blocks
//!
//! This module provides:
//! - Student repository URL parsing
//! - Commit history analytics and date filters
//! - CI log scanning and pipeline inspection
//! - Repository file checks and mirroring
//! - The per-assignment results file

pub mod ci_log;
pub mod commits;
pub mod download;
pub mod files;
pub mod pipeline;
pub mod report;
pub mod url;

pub use ci_log::{analyze_test_results, TestTally};
pub use download::{download_tree, DownloadStats};
pub use pipeline::PipelineLogReport;
pub use report::{append_result, ResultEntry};
pub use url::RepoCoordinates;
