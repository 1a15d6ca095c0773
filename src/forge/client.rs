//! GitLab REST API v4 client

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::ForgeError;
use super::types::{Branch, Commit, Job, MergeRequest, Pipeline, Project, RepoFile, TreeEntry, User};
use super::ForgeApi;

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const NEXT_PAGE_HEADER: &str = "x-next-page";
const PER_PAGE: u32 = 100;
const USER_AGENT: &str = concat!("goobits-grader/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for a single GitLab instance
pub struct GitLabClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl GitLabClient {
    /// Builds a client for `base_url` (e.g. `http://gitlab.example.edu/`)
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ForgeError> {
        let api_base = api_base_url(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_base,
            token: token.to_string(),
        })
    }

    /// Returns the `/api/v4` root this client talks to
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ForgeError> {
        endpoint_url(&self.api_base, segments)
    }

    async fn send(&self, url: Url, query: &[(&str, String)], what: &str) -> Result<Response, ForgeError> {
        debug!(%url, ?query, "GET");
        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .query(query)
            .send()
            .await?;
        check_status(response, what)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, ForgeError> {
        let url = self.endpoint(segments)?;
        let response = self.send(url, query, what).await?;
        response.json::<T>().await.map_err(|e| ForgeError::decode(what, e))
    }

    /// Fetches every page of a list endpoint, following `X-Next-Page`
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<T>, ForgeError> {
        let url = self.endpoint(segments)?;
        let mut items = Vec::new();
        let mut page = Some(1u32);

        while let Some(current) = page {
            let mut paged_query = query.to_vec();
            paged_query.push(("per_page", PER_PAGE.to_string()));
            paged_query.push(("page", current.to_string()));

            let response = self.send(url.clone(), &paged_query, what).await?;
            let next = next_page(response.headers());
            let batch: Vec<T> = response.json().await.map_err(|e| ForgeError::decode(what, e))?;

            page = match next {
                Some(next) if !batch.is_empty() && next > current => Some(next),
                _ => None,
            };
            items.extend(batch);
        }

        debug!(what, count = items.len(), "fetched all pages");
        Ok(items)
    }
}

#[async_trait]
impl ForgeApi for GitLabClient {
    async fn current_user(&self) -> Result<User, ForgeError> {
        self.get_json(&["user"], &[], "current user").await
    }

    async fn project(&self, path: &str) -> Result<Project, ForgeError> {
        self.get_json(&["projects", path], &[], &format!("project '{path}'"))
            .await
    }

    async fn branches(&self, project_id: u64) -> Result<Vec<Branch>, ForgeError> {
        let id = project_id.to_string();
        self.get_paginated(&["projects", &id, "repository", "branches"], &[], "branches")
            .await
    }

    async fn commits(&self, project_id: u64, ref_name: &str) -> Result<Vec<Commit>, ForgeError> {
        let id = project_id.to_string();
        self.get_paginated(
            &["projects", &id, "repository", "commits"],
            &[("ref_name", ref_name.to_string())],
            "commits",
        )
        .await
    }

    async fn pipelines(&self, project_id: u64, ref_name: &str) -> Result<Vec<Pipeline>, ForgeError> {
        let id = project_id.to_string();
        self.get_paginated(
            &["projects", &id, "pipelines"],
            &[("ref", ref_name.to_string())],
            "pipelines",
        )
        .await
    }

    async fn pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>, ForgeError> {
        let id = project_id.to_string();
        let pipeline = pipeline_id.to_string();
        self.get_paginated(
            &["projects", &id, "pipelines", &pipeline, "jobs"],
            &[],
            &format!("jobs of pipeline {pipeline_id}"),
        )
        .await
    }

    async fn job(&self, project_id: u64, job_id: u64) -> Result<Job, ForgeError> {
        let id = project_id.to_string();
        let job = job_id.to_string();
        self.get_json(&["projects", &id, "jobs", &job], &[], &format!("job {job_id}"))
            .await
    }

    async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>, ForgeError> {
        let id = project_id.to_string();
        let job = job_id.to_string();
        let url = self.endpoint(&["projects", &id, "jobs", &job, "trace"])?;
        let response = self.send(url, &[], &format!("log of job {job_id}")).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn repository_tree(
        &self,
        project_id: u64,
        ref_name: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, ForgeError> {
        let id = project_id.to_string();
        let mut query = vec![("ref", ref_name.to_string())];
        if !path.is_empty() {
            query.push(("path", path.to_string()));
        }
        self.get_paginated(
            &["projects", &id, "repository", "tree"],
            &query,
            &format!("tree '{path}'"),
        )
        .await
    }

    async fn file(&self, project_id: u64, file_path: &str, ref_name: &str) -> Result<RepoFile, ForgeError> {
        let id = project_id.to_string();
        self.get_json(
            &["projects", &id, "repository", "files", file_path],
            &[("ref", ref_name.to_string())],
            &format!("file '{file_path}'"),
        )
        .await
    }

    async fn merge_requests(&self, project_id: u64) -> Result<Vec<MergeRequest>, ForgeError> {
        let id = project_id.to_string();
        self.get_paginated(
            &["projects", &id, "merge_requests"],
            &[("state", "all".to_string())],
            "merge requests",
        )
        .await
    }
}

/// Turns the forge URL into its `/api/v4` root
fn api_base_url(base_url: &str) -> Result<Url, ForgeError> {
    let mut url = Url::parse(base_url).map_err(|e| ForgeError::InvalidUrl(format!("{base_url}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ForgeError::InvalidUrl(format!("{base_url}: expected http or https")));
    }
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| ForgeError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(["api", "v4"]);
    Ok(url)
}

/// Appends path segments, percent-encoding each one (so `group/project` becomes `group%2Fproject`)
fn endpoint_url(api_base: &Url, segments: &[&str]) -> Result<Url, ForgeError> {
    let mut url = api_base.clone();
    url.path_segments_mut()
        .map_err(|()| ForgeError::InvalidUrl(api_base.to_string()))?
        .extend(segments);
    Ok(url)
}

fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(NEXT_PAGE_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn check_status(response: Response, what: &str) -> Result<Response, ForgeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ForgeError::Authentication),
        StatusCode::NOT_FOUND => Err(ForgeError::NotFound {
            what: what.to_string(),
        }),
        _ => Err(ForgeError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        }),
    }
}
