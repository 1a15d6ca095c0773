//! Student repository URL parsing
//!
//! Student repositories follow the classroom naming convention
//! `<forge>/<username>-<course>/<kind>-<number>`, for example
//! `http://gitlab.example.edu/abc123-cse262/homework-2`.

use anyhow::{bail, Context, Result};
use reqwest::Url;
use std::path::{Path, PathBuf};

/// Identity of one student submission, derived from its repository URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoCoordinates {
    /// The URL exactly as given on the command line (trimmed)
    pub repo_url: String,
    /// `namespace/project` path used for the project lookup
    pub project_path: String,
    pub username: String,
    /// Assignment kind, e.g. `homework` or `quiz`
    pub kind: String,
    /// Assignment number as written in the URL
    pub number: String,
}

impl RepoCoordinates {
    pub fn parse(repo_url: &str) -> Result<Self> {
        let repo_url = repo_url.trim();
        let url = Url::parse(repo_url).with_context(|| format!("Invalid repository URL: {repo_url}"))?;

        let path = url.path().trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if parts.len() < 2 {
            bail!("Repository URL must look like <forge>/<username>-<course>/<kind>-<number>: {repo_url}");
        }

        let username = parts[0].split('-').next().unwrap_or_default();
        if username.is_empty() {
            bail!("Repository URL has no username before '-': {repo_url}");
        }

        let assignment = parts[1];
        let kind = assignment.split('-').next().unwrap_or(assignment);
        let number = assignment.rsplit('-').next().unwrap_or(assignment);

        Ok(Self {
            repo_url: repo_url.to_string(),
            project_path: parts.join("/"),
            username: username.to_string(),
            kind: kind.to_string(),
            number: number.to_string(),
        })
    }

    /// `<kind>-<number>`, e.g. `homework-2`
    pub fn assignment_label(&self) -> String {
        format!("{}-{}", self.kind, self.number)
    }

    /// Folder holding the shared `results.txt` for this assignment
    pub fn result_folder(&self, results_root: &Path) -> PathBuf {
        results_root.join(self.assignment_label())
    }

    /// Local mirror location: `<root>/<kind>-<n>/<username>-<course>/<kind>-<n>`
    pub fn mirror_dir(&self, mirror_root: &Path, course: &str) -> PathBuf {
        let label = self.assignment_label();
        mirror_root
            .join(&label)
            .join(format!("{}-{}", self.username, course))
            .join(&label)
    }
}
