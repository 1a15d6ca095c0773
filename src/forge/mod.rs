//! Forge (self-hosted GitLab) access
//!
//! The grader talks to the forge only through [`ForgeApi`], so the audit
//! command can run against [`GitLabClient`] or an in-memory implementation.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::GitLabClient;
pub use error::ForgeError;
pub use types::{Branch, Commit, Job, MergeRequest, MergeRequestAuthor, Pipeline, Project, RepoFile, TreeEntry, User};

/// Read-only operations the grader needs from a forge
///
/// List operations return every page. Commits and pipelines come back newest first.
#[async_trait]
pub trait ForgeApi: Send + Sync {
    /// Returns the account behind the token; fails with [`ForgeError::Authentication`] on a bad token
    async fn current_user(&self) -> Result<User, ForgeError>;

    /// Looks up a project by its `namespace/name` path
    async fn project(&self, path: &str) -> Result<Project, ForgeError>;

    async fn branches(&self, project_id: u64) -> Result<Vec<Branch>, ForgeError>;

    async fn commits(&self, project_id: u64, ref_name: &str) -> Result<Vec<Commit>, ForgeError>;

    async fn pipelines(&self, project_id: u64, ref_name: &str) -> Result<Vec<Pipeline>, ForgeError>;

    async fn pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>, ForgeError>;

    async fn job(&self, project_id: u64, job_id: u64) -> Result<Job, ForgeError>;

    /// Raw job log bytes; empty when the job produced no output
    async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>, ForgeError>;

    /// Lists one directory level; `path` is empty for the repository root
    async fn repository_tree(
        &self,
        project_id: u64,
        ref_name: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, ForgeError>;

    async fn file(&self, project_id: u64, file_path: &str, ref_name: &str) -> Result<RepoFile, ForgeError>;

    /// Merge requests in any state
    async fn merge_requests(&self, project_id: u64) -> Result<Vec<MergeRequest>, ForgeError>;
}
