//! Grader settings
//!
//! Settings are layered: built-in defaults, then the TOML settings file, then
//! environment variables, then command-line overrides applied by the binary.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::config::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DATE_FORMAT, DEFAULT_COMMITS_SINCE, DEFAULT_COURSE,
    DEFAULT_GITLAB_URL, DEFAULT_MIRROR_ROOT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_REQUIRED_FILES,
    DEFAULT_RESULTS_ROOT, DEFAULT_TEST_FILE, DEFAULT_TEST_MARKER, DEFAULT_WINDOW_END,
    DEFAULT_WINDOW_START, ENV_GITLAB_URL, ENV_PRIVATE_TOKEN, SKIP_LOG_ANALYSIS_KINDS,
};

/// Everything the audit command needs besides the repository URL
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditSettings {
    pub gitlab_url: String,
    pub private_token: Option<String>,
    /// Course suffix used in mirror folder names (`<username>-<course>`)
    pub course: String,
    pub results_root: PathBuf,
    pub mirror_root: PathBuf,
    /// Top-level files every submission must contain
    pub required_files: Vec<String>,
    /// Repository file whose test markers are counted
    pub test_file: String,
    pub test_marker: String,
    pub commits_since: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Mirror the repository tree to disk
    pub download: bool,
    /// Assignment kinds graded without CI log analysis
    pub skip_log_analysis_for: Vec<String>,
    pub request_timeout_secs: u64,
    /// Audit this ref instead of the project's default branch; set only from `--ref`
    #[serde(skip)]
    pub ref_override: Option<String>,
}

fn default_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, DATE_FORMAT).expect("built-in dates use YYYY-MM-DD")
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            gitlab_url: DEFAULT_GITLAB_URL.to_string(),
            private_token: None,
            course: DEFAULT_COURSE.to_string(),
            results_root: PathBuf::from(DEFAULT_RESULTS_ROOT),
            mirror_root: PathBuf::from(DEFAULT_MIRROR_ROOT),
            required_files: DEFAULT_REQUIRED_FILES.iter().map(|s| s.to_string()).collect(),
            test_file: DEFAULT_TEST_FILE.to_string(),
            test_marker: DEFAULT_TEST_MARKER.to_string(),
            commits_since: default_date(DEFAULT_COMMITS_SINCE),
            window_start: default_date(DEFAULT_WINDOW_START),
            window_end: default_date(DEFAULT_WINDOW_END),
            download: true,
            skip_log_analysis_for: SKIP_LOG_ANALYSIS_KINDS.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            ref_override: None,
        }
    }
}

/// `<config_dir>/goobits-grader/config.toml`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl AuditSettings {
    /// Loads defaults, the settings file and the process environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default_path) if default_path.is_file() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        info!(path = %path.display(), "settings file loaded");
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `GITLAB_URL` and `GITLAB_PRIVATE_TOKEN`; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(ENV_GITLAB_URL) {
            self.gitlab_url = url;
        }
        if let Some(token) = non_empty(ENV_PRIVATE_TOKEN) {
            self.private_token = Some(token);
        }
    }

    /// Checks the settings before any network access
    pub fn validate(&self) -> Result<()> {
        self.token()?;

        let url = reqwest::Url::parse(&self.gitlab_url)
            .with_context(|| format!("Invalid forge URL: {}", self.gitlab_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "Forge URL must use http or https: {}",
            self.gitlab_url
        );

        anyhow::ensure!(
            self.window_start <= self.window_end,
            "Commit window start {} is after its end {}",
            self.window_start,
            self.window_end
        );
        anyhow::ensure!(self.request_timeout_secs > 0, "Request timeout must be at least one second");
        anyhow::ensure!(!self.test_marker.is_empty(), "Test marker cannot be empty");

        Ok(())
    }

    /// The private token, or an error naming the variable that should hold it
    pub fn token(&self) -> Result<&str> {
        match self.private_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => anyhow::bail!("{ENV_PRIVATE_TOKEN} environment variable not set"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when `kind` is graded without looking at CI logs
    pub fn skips_log_analysis(&self, kind: &str) -> bool {
        self.skip_log_analysis_for
            .iter()
            .any(|skipped| skipped.eq_ignore_ascii_case(kind))
    }
}
