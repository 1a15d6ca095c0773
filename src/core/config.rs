//! Configuration constants and settings defaults

// Forge connection
pub const DEFAULT_GITLAB_URL: &str = "http://gitlab.cse.lehigh.edu/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const ENV_GITLAB_URL: &str = "GITLAB_URL";
pub const ENV_PRIVATE_TOKEN: &str = "GITLAB_PRIVATE_TOKEN";

// Settings file location: <config_dir>/goobits-grader/config.toml
pub const CONFIG_DIR_NAME: &str = "goobits-grader";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Classroom conventions
pub const DEFAULT_COURSE: &str = "cse262";
pub const DEFAULT_RESULTS_ROOT: &str = "./cicd";
pub const DEFAULT_MIRROR_ROOT: &str = "repo";
pub const DEFAULT_REQUIRED_FILES: &[&str] = &["README.md"];
pub const DEFAULT_TEST_FILE: &str = "tests/lex.rs";
pub const DEFAULT_TEST_MARKER: &str = "#[test]";
pub const SKIP_LOG_ANALYSIS_KINDS: &[&str] = &["quiz"];

// Semester dates (YYYY-MM-DD)
pub const DEFAULT_COMMITS_SINCE: &str = "2024-08-15";
pub const DEFAULT_WINDOW_START: &str = "2024-09-01";
pub const DEFAULT_WINDOW_END: &str = "2024-09-30";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Used when the project reports no default branch (empty repository)
pub const FALLBACK_BRANCH: &str = "master";

// Results file
pub const RESULTS_FILE_NAME: &str = "results.txt";
pub const RESULTS_DELIMITER_WIDTH: usize = 10;

// Display formatting
pub const COMMIT_RULE_WIDTH: usize = 40;
pub const STATUS_BANNER_WIDTH: usize = 50;
pub const PROGRESS_TEMPLATE: &str = "{spinner} {prefix:.bold} {wide_msg}";
