//! Forge API models
//!
//! Only the fields the grader reads are modelled; serde ignores the rest of
//! each GitLab v4 payload.

use base64::Engine;
use serde::Deserialize;

use super::error::ForgeError;

/// The account the access token belongs to
#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path_with_namespace: String,
    /// Absent for repositories without any commit
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    /// RFC 3339 timestamp with the committer's offset, e.g. `2024-09-08T21:57:57.000-04:00`
    pub created_at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub status: String,
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Pipeline {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub stage: String,
}

/// One entry of a repository tree listing (a single directory level)
#[derive(Clone, Debug, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    /// `tree`, `blob` or `commit` (submodule)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub path: String,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == "tree"
    }

    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// File payload from the repository files endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct RepoFile {
    pub file_path: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub content: String,
}

impl RepoFile {
    /// Returns the raw file bytes
    pub fn decoded_content(&self) -> Result<Vec<u8>, ForgeError> {
        if self.encoding != "base64" {
            return Ok(self.content.as_bytes().to_vec());
        }

        let compact: String = self.content.split_whitespace().collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| ForgeError::decode(format!("file '{}'", self.file_path), e))
    }

    /// Returns the file as UTF-8 text
    pub fn decoded_text(&self) -> Result<String, ForgeError> {
        let bytes = self.decoded_content()?;
        String::from_utf8(bytes)
            .map_err(|e| ForgeError::decode(format!("file '{}' as UTF-8", self.file_path), e))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MergeRequestAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MergeRequest {
    pub iid: u64,
    pub title: String,
    pub state: String,
    pub author: MergeRequestAuthor,
}
