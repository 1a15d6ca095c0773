//! Test fixtures and builders

use goobits_grader::core::AuditSettings;
use std::path::Path;

use super::forge::{job, FakeForge};

pub const REPO_URL: &str = "http://gitlab.example.edu/abc123-cse262/homework-2";
pub const PROJECT_PATH: &str = "abc123-cse262/homework-2";

/// Settings that keep every output inside `root`
pub fn test_settings(root: &Path) -> AuditSettings {
    AuditSettings {
        gitlab_url: "http://gitlab.example.edu/".to_string(),
        private_token: Some("test-token".to_string()),
        results_root: root.join("cicd"),
        mirror_root: root.join("repo"),
        ..AuditSettings::default()
    }
}

/// `cargo test` output for a run with the given outcomes
pub fn cargo_test_log(passed: &[&str], failed: &[&str]) -> String {
    let mut log = String::from("Running with gitlab-runner 16.4.0\n$ cargo test\n");
    log.push_str(&format!("running {} tests\n", passed.len() + failed.len()));
    for name in passed {
        log.push_str(&format!("test {name} ... ok\n"));
    }
    for name in failed {
        log.push_str(&format!("test {name} ... FAILED\n"));
    }
    log.push_str("Job succeeded\n");
    log
}

/// A homework submission with source files, history and one CI pipeline
pub fn sample_forge() -> FakeForge {
    FakeForge::new(PROJECT_PATH)
        .with_file("README.md", "# Homework 2\n")
        .with_file("Cargo.toml", "[package]\nname = \"lexer\"\nversion = \"0.1.0\"\n")
        .with_file("src/main.rs", "fn main() {}\n")
        .with_file("src/lexer/mod.rs", "pub fn lex() {}\n")
        .with_file(
            "tests/lex.rs",
            "#[test]\nfn keywords() {}\n\n#[test]\nfn numbers() {}\n\n#[test]\nfn strings() {}\n",
        )
        .with_file("assets/logo.png", [0x89u8, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0x00])
        .with_commit("Student", "2024-09-29T22:15:00.000-04:00")
        .with_commit("Student", "2024-09-08T21:57:57.000-04:00")
        .with_commit("Instructor", "2024-08-15T12:00:00.000-04:00")
        .with_pipeline(
            77,
            "failed",
            vec![
                job(701, "build", "success", ""),
                job(702, "test", "failed", &cargo_test_log(&["keywords", "numbers"], &["strings"])),
            ],
        )
        .with_merge_request(1, "Finish lexer", "merged")
}
