//! In-memory forge for driving the grade command without a network

use async_trait::async_trait;
use base64::Engine;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use goobits_grader::forge::{
    Branch, Commit, ForgeApi, ForgeError, Job, MergeRequest, MergeRequestAuthor, Pipeline, Project,
    RepoFile, TreeEntry, User,
};

/// A pipeline job together with the log it produced
#[derive(Clone)]
pub struct FakeJob {
    pub job: Job,
    pub trace: Vec<u8>,
}

/// A single GitLab project and the state of its repository
pub struct FakeForge {
    pub reject_token: bool,
    pub project: Project,
    pub branches: Vec<Branch>,
    /// Newest first
    pub commits: Vec<Commit>,
    pub fail_commits: bool,
    /// Newest first
    pub pipelines: Vec<(Pipeline, Vec<FakeJob>)>,
    /// Repository files by full path
    pub files: BTreeMap<String, Vec<u8>>,
    pub unreadable_files: HashSet<String>,
    pub merge_requests: Vec<MergeRequest>,
    /// Job ids whose log was requested, in order
    pub trace_requests: Mutex<Vec<u64>>,
}

impl FakeForge {
    pub fn new(path_with_namespace: &str) -> Self {
        let name = path_with_namespace.rsplit('/').next().unwrap_or(path_with_namespace);
        Self {
            reject_token: false,
            project: Project {
                id: 42,
                name: name.to_string(),
                path_with_namespace: path_with_namespace.to_string(),
                default_branch: Some("main".to_string()),
                web_url: format!("http://gitlab.example.edu/{path_with_namespace}"),
            },
            branches: vec![Branch {
                name: "main".to_string(),
                default: true,
            }],
            commits: Vec::new(),
            fail_commits: false,
            pipelines: Vec::new(),
            files: BTreeMap::new(),
            unreadable_files: HashSet::new(),
            merge_requests: Vec::new(),
            trace_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.files.insert(path.to_string(), content.as_ref().to_vec());
        self
    }

    pub fn with_unreadable_file(mut self, path: &str) -> Self {
        self.files.insert(path.to_string(), Vec::new());
        self.unreadable_files.insert(path.to_string());
        self
    }

    /// Adds a commit older than every commit added so far
    pub fn with_commit(mut self, author: &str, created_at: &str) -> Self {
        let n = self.commits.len() + 1;
        self.commits.push(Commit {
            id: format!("{n:040x}"),
            short_id: format!("{n:08x}"),
            title: format!("Commit {n}"),
            message: format!("Commit {n}\n"),
            author_name: author.to_string(),
            author_email: format!("{}@example.edu", author.to_lowercase()),
            created_at: created_at.to_string(),
        });
        self
    }

    /// Adds a pipeline older than every pipeline added so far
    pub fn with_pipeline(mut self, id: u64, status: &str, jobs: Vec<FakeJob>) -> Self {
        self.pipelines.push((
            Pipeline {
                id,
                status: status.to_string(),
                ref_name: "main".to_string(),
                created_at: Some("2024-09-20T10:00:00.000-04:00".to_string()),
            },
            jobs,
        ));
        self
    }

    pub fn with_merge_request(mut self, iid: u64, title: &str, state: &str) -> Self {
        self.merge_requests.push(MergeRequest {
            iid,
            title: title.to_string(),
            state: state.to_string(),
            author: MergeRequestAuthor {
                name: "Student".to_string(),
                username: "student".to_string(),
            },
        });
        self
    }

    pub fn requested_traces(&self) -> Vec<u64> {
        self.trace_requests.lock().unwrap().clone()
    }

    fn check_project(&self, project_id: u64) -> Result<(), ForgeError> {
        if project_id == self.project.id {
            Ok(())
        } else {
            Err(ForgeError::NotFound {
                what: format!("project {project_id}"),
            })
        }
    }

    fn find_job(&self, job_id: u64) -> Option<&FakeJob> {
        self.pipelines
            .iter()
            .flat_map(|(_, jobs)| jobs.iter())
            .find(|fake| fake.job.id == job_id)
    }
}

/// Builds a job fixture
pub fn job(id: u64, name: &str, status: &str, trace: &str) -> FakeJob {
    FakeJob {
        job: Job {
            id,
            name: name.to_string(),
            status: status.to_string(),
            stage: "test".to_string(),
        },
        trace: trace.as_bytes().to_vec(),
    }
}

#[async_trait]
impl ForgeApi for FakeForge {
    async fn current_user(&self) -> Result<User, ForgeError> {
        if self.reject_token {
            return Err(ForgeError::Authentication);
        }
        Ok(User {
            id: 1,
            username: "grader".to_string(),
            name: "Course Grader".to_string(),
        })
    }

    async fn project(&self, path: &str) -> Result<Project, ForgeError> {
        if path == self.project.path_with_namespace {
            Ok(self.project.clone())
        } else {
            Err(ForgeError::NotFound {
                what: format!("project '{path}'"),
            })
        }
    }

    async fn branches(&self, project_id: u64) -> Result<Vec<Branch>, ForgeError> {
        self.check_project(project_id)?;
        Ok(self.branches.clone())
    }

    async fn commits(&self, project_id: u64, _ref_name: &str) -> Result<Vec<Commit>, ForgeError> {
        self.check_project(project_id)?;
        if self.fail_commits {
            return Err(ForgeError::Status {
                url: "http://gitlab.example.edu/api/v4/projects/42/repository/commits".to_string(),
                status: 500,
            });
        }
        Ok(self.commits.clone())
    }

    async fn pipelines(&self, project_id: u64, _ref_name: &str) -> Result<Vec<Pipeline>, ForgeError> {
        self.check_project(project_id)?;
        Ok(self.pipelines.iter().map(|(pipeline, _)| pipeline.clone()).collect())
    }

    async fn pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>, ForgeError> {
        self.check_project(project_id)?;
        self.pipelines
            .iter()
            .find(|(pipeline, _)| pipeline.id == pipeline_id)
            .map(|(_, jobs)| jobs.iter().map(|fake| fake.job.clone()).collect())
            .ok_or_else(|| ForgeError::NotFound {
                what: format!("pipeline {pipeline_id}"),
            })
    }

    async fn job(&self, project_id: u64, job_id: u64) -> Result<Job, ForgeError> {
        self.check_project(project_id)?;
        self.find_job(job_id)
            .map(|fake| fake.job.clone())
            .ok_or_else(|| ForgeError::NotFound {
                what: format!("job {job_id}"),
            })
    }

    async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>, ForgeError> {
        self.check_project(project_id)?;
        self.trace_requests.lock().unwrap().push(job_id);
        self.find_job(job_id)
            .map(|fake| fake.trace.clone())
            .ok_or_else(|| ForgeError::NotFound {
                what: format!("log of job {job_id}"),
            })
    }

    async fn repository_tree(
        &self,
        project_id: u64,
        _ref_name: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, ForgeError> {
        self.check_project(project_id)?;

        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };
        let mut trees = BTreeSet::new();
        let mut blobs = BTreeSet::new();
        for file_path in self.files.keys() {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    trees.insert(dir.to_string());
                }
                None => {
                    blobs.insert(rest.to_string());
                }
            }
        }

        if !path.is_empty() && trees.is_empty() && blobs.is_empty() {
            return Err(ForgeError::NotFound {
                what: format!("tree '{path}'"),
            });
        }

        let entry = |name: String, kind: &str| TreeEntry {
            path: format!("{prefix}{name}"),
            name,
            kind: kind.to_string(),
        };
        let mut entries: Vec<TreeEntry> = trees.into_iter().map(|name| entry(name, "tree")).collect();
        entries.extend(blobs.into_iter().map(|name| entry(name, "blob")));
        Ok(entries)
    }

    async fn file(&self, project_id: u64, file_path: &str, _ref_name: &str) -> Result<RepoFile, ForgeError> {
        self.check_project(project_id)?;
        if self.unreadable_files.contains(file_path) {
            return Err(ForgeError::Status {
                url: format!("http://gitlab.example.edu/api/v4/projects/42/repository/files/{file_path}"),
                status: 500,
            });
        }

        let content = self.files.get(file_path).ok_or_else(|| ForgeError::NotFound {
            what: format!("file '{file_path}'"),
        })?;
        Ok(RepoFile {
            file_path: file_path.to_string(),
            encoding: "base64".to_string(),
            content: base64::engine::general_purpose::STANDARD.encode(content),
        })
    }

    async fn merge_requests(&self, project_id: u64) -> Result<Vec<MergeRequest>, ForgeError> {
        self.check_project(project_id)?;
        Ok(self.merge_requests.clone())
    }
}
