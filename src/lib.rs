//! # goobits-grader
//!
//! `goobits-grader` audits student assignment repositories hosted on a
//! self-hosted GitLab forge. It powers the `grade-repo` CLI tool.
//!
//! ## Core Features
//!
//! - **Forge Access**: Authenticated GitLab v4 client behind the [`forge::ForgeApi`] trait.
//! - **Commit Analytics**: Counts, per-author totals, daily frequency and date windows.
//! - **CI Results**: Pipeline status and test counts scanned from job logs.
//! - **Mirroring**: Local copy of the repository tree at the audited branch.
//! - **Results File**: One delimited entry per student in `<assignment>/results.txt`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use goobits_grader::commands::handle_grade_command;
//! use goobits_grader::core::AuditSettings;
//! use goobits_grader::forge::GitLabClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = AuditSettings::load(None)?;
//!     settings.validate()?;
//!     let client = GitLabClient::new(&settings.gitlab_url, settings.token()?, settings.request_timeout())?;
//!     let summary = handle_grade_command(
//!         &client,
//!         &settings,
//!         "http://gitlab.cse.lehigh.edu/abc123-cse262/homework-2",
//!     )
//!     .await?;
//!     println!("{} commits", summary.commit_count);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod forge;
pub mod grading;
pub mod utils;
