//! Grade command implementation
//!
//! This module audits one student repository in a fixed order:
//! - Authentication and project lookup (fatal on failure)
//! - Branches, top-level contents, test file and CI job checks
//! - Commit history, required files and merge requests
//! - Repository mirroring
//! - CI log analysis and the results file entry
//!
//! Every step after the project lookup reports its own failure and carries on
//! with an empty value, so one broken endpoint never loses a student's entry.

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::{COMMIT_RULE_WIDTH, FALLBACK_BRANCH, PROGRESS_TEMPLATE, STATUS_BANNER_WIDTH};
use crate::core::AuditSettings;
use crate::forge::{Commit, ForgeApi, Pipeline, Project};
use crate::grading::commits::{commit_frequency, commits_after, commits_between, commits_per_author, date_range};
use crate::grading::files::{check_required_files, count_tests_in_file, describe_entry};
use crate::grading::pipeline::{analyze_pipeline_logs, passed_test_jobs_in_latest};
use crate::grading::{append_result, download_tree, DownloadStats, RepoCoordinates, ResultEntry, TestTally};
use crate::utils::{print_banner, rule, set_terminal_title, set_terminal_title_and_flush};

const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please check your access token.";
const PROJECT_FAILED_MESSAGE: &str = "Failed to retrieve the project. Please check the repository URL.";

/// What one audit run found and where it wrote its output
#[derive(Clone, Debug)]
pub struct AuditSummary {
    pub username: String,
    pub ref_name: String,
    pub commit_count: usize,
    /// Test markers counted in the configured test file
    pub test_count: usize,
    /// Successful test jobs in the newest pipeline
    pub passed_test_jobs: usize,
    pub tally: TestTally,
    pub missing_files: Vec<String>,
    pub merge_request_count: usize,
    pub results_file: PathBuf,
    pub mirror_dir: Option<PathBuf>,
    pub download: Option<DownloadStats>,
}

/// Main handler for the grade command
pub async fn handle_grade_command(
    forge: &dyn ForgeApi,
    settings: &AuditSettings,
    repo_url: &str,
) -> Result<AuditSummary> {
    set_terminal_title("🚀 grade-repo");
    let result = run_audit(forge, settings, repo_url).await;
    set_terminal_title_and_flush("✅ grade-repo");
    result
}

/// Unwraps a step result, reporting the failure and falling back to the default value
fn recover<T: Default, E: Display>(result: Result<T, E>, step: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            println!("❌ {step}: {e}");
            debug!(step, error = %e, "step failed, continuing with empty result");
            T::default()
        }
    }
}

async fn run_audit(forge: &dyn ForgeApi, settings: &AuditSettings, repo_url: &str) -> Result<AuditSummary> {
    let coords = RepoCoordinates::parse(repo_url)?;

    match forge.current_user().await {
        Ok(user) => println!("✅ Successfully authenticated with GitLab as {}.", user.username),
        Err(e) if e.is_authentication() => bail!(AUTH_FAILED_MESSAGE),
        Err(e) => return Err(anyhow!(e).context("An error occurred while connecting to GitLab")),
    }

    let project = forge
        .project(&coords.project_path)
        .await
        .context(PROJECT_FAILED_MESSAGE)?;
    println!("📦 Accessed project: {}", project.name);
    info!(project = %project.path_with_namespace, id = project.id, "auditing project");

    list_branches(forge, &project).await;

    let ref_name = select_ref(settings, &project);
    println!("\n🌿 Auditing branch: {ref_name}");

    println!("\n📂 Contents of the repository '{}':", project.name);
    list_repo_contents(forge, &project, &ref_name).await;

    let test_count = recover(
        count_tests_in_file(forge, project.id, &ref_name, &settings.test_file, &settings.test_marker).await,
        &format!("Failed to count tests in '{}'", settings.test_file),
    );
    println!("\n🧪 Number of tests in '{}': {test_count}", settings.test_file);

    let passed_test_jobs = recover(
        passed_test_jobs_in_latest(forge, project.id, &ref_name).await,
        "Failed to retrieve pipelines or jobs",
    );
    println!("🧪 Number of passed test jobs in the latest CI/CD pipeline: {passed_test_jobs}");

    let result_folder = coords.result_folder(&settings.results_root);
    std::fs::create_dir_all(&result_folder)
        .with_context(|| format!("Failed to create result folder {}", result_folder.display()))?;

    let commits = recover(forge.commits(project.id, &ref_name).await, "Failed to retrieve commits");
    println!("\n🔢 Total number of commits on branch '{ref_name}': {}", commits.len());
    print_commit_details(&commits, &ref_name);
    print_commits_per_author(&commits, &ref_name);
    print_commit_frequency(&commits, &ref_name);

    let missing_files = match check_required_files(forge, project.id, &ref_name, &settings.required_files).await {
        Ok(missing) => missing,
        Err(e) => {
            println!("❌ Failed to retrieve repository files: {e}");
            settings.required_files.clone()
        }
    };
    print_missing_files(&missing_files);

    let merge_request_count = list_merge_requests(forge, &project).await;

    let (mirror_dir, download) = if settings.download {
        let mirror_dir = coords.mirror_dir(&settings.mirror_root, &settings.course);
        let stats = mirror_repository(forge, &project, &ref_name, &mirror_dir).await;
        (Some(mirror_dir), stats)
    } else {
        println!("\n⏭️  Skipping repository download");
        (None, None)
    };

    report_commit_windows(&commits, settings);

    let pipelines = check_ci_status(forge, &project, &ref_name).await;

    let tally = if settings.skips_log_analysis(&coords.kind) {
        println!("\n⏭️  Skipping CI log analysis for {} assignments", coords.kind);
        TestTally::default()
    } else {
        match pipelines.first() {
            Some(latest) => analyze_latest_pipeline(forge, &project, latest).await,
            None => TestTally::default(),
        }
    };

    let entry = ResultEntry {
        username: coords.username.clone(),
        repo_url: coords.repo_url.clone(),
        commit_count: commits.len(),
        tally,
    };
    let results_file = append_result(&result_folder, &entry)?;
    println!(
        "\n📝 Recorded {} for {}: {} commits, {} tests, {} passed, {} failed",
        coords.assignment_label(),
        coords.username,
        entry.commit_count,
        tally.total,
        tally.passed,
        tally.failed
    );
    println!("   {}", results_file.display());

    Ok(AuditSummary {
        username: coords.username,
        ref_name,
        commit_count: entry.commit_count,
        test_count,
        passed_test_jobs,
        tally,
        missing_files,
        merge_request_count,
        results_file,
        mirror_dir,
        download,
    })
}

/// The ref to audit: explicit override, else the project default, else `master`
fn select_ref(settings: &AuditSettings, project: &Project) -> String {
    settings
        .ref_override
        .clone()
        .or_else(|| project.default_branch.clone())
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
}

async fn list_branches(forge: &dyn ForgeApi, project: &Project) {
    let branches = recover(forge.branches(project.id).await, "Failed to list branches");
    println!("\n🌿 Available branches:");
    for branch in &branches {
        let marker = if branch.default { " (default)" } else { "" };
        println!("  - {}{marker}", branch.name);
    }
}

async fn list_repo_contents(forge: &dyn ForgeApi, project: &Project, ref_name: &str) {
    let entries = recover(
        forge.repository_tree(project.id, ref_name, "").await,
        "Failed to retrieve repository contents",
    );
    if entries.is_empty() {
        println!("  No items found in the repository.");
        return;
    }
    for entry in &entries {
        println!("  {}", describe_entry(entry));
    }
}

fn print_commit_details(commits: &[Commit], ref_name: &str) {
    println!("\nCommit details for branch '{ref_name}':");
    for commit in commits {
        println!("Commit ID: {}", commit.id);
        println!("Author: {} <{}>", commit.author_name, commit.author_email);
        println!("Date: {}", commit.created_at);
        println!("Message: {}", commit.message.trim_end());
        println!("{}", rule(COMMIT_RULE_WIDTH));
    }
}

fn print_commits_per_author(commits: &[Commit], ref_name: &str) {
    println!("\n👥 Commits per author on branch '{ref_name}':");
    for (author, count) in commits_per_author(commits) {
        println!("{author}: {count} commit(s)");
    }
}

fn print_commit_frequency(commits: &[Commit], ref_name: &str) {
    println!("\n📅 Commit frequency on branch '{ref_name}':");
    for (date, count) in commit_frequency(commits) {
        println!("{date}: {count} commit(s)");
    }
}

fn print_missing_files(missing: &[String]) {
    if missing.is_empty() {
        println!("\n✅ All required files are present.");
    } else {
        println!("\n⚠️  Missing required files:");
        for file in missing {
            println!("  - {file}");
        }
    }
}

async fn list_merge_requests(forge: &dyn ForgeApi, project: &Project) -> usize {
    let merge_requests = recover(forge.merge_requests(project.id).await, "Failed to retrieve merge requests");
    if merge_requests.is_empty() {
        println!("\nNo merge requests found.");
        return 0;
    }

    println!("\n🔀 Merge requests:");
    for mr in &merge_requests {
        println!(
            "ID: {}, Title: {}, State: {}, Author: {}",
            mr.iid, mr.title, mr.state, mr.author.name
        );
    }
    merge_requests.len()
}

async fn mirror_repository(
    forge: &dyn ForgeApi,
    project: &Project,
    ref_name: &str,
    mirror_dir: &std::path::Path,
) -> Option<DownloadStats> {
    println!("\n⬇️  Downloading repository to {}", mirror_dir.display());

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE) {
        progress.set_style(style);
    }
    progress.set_prefix("downloading");
    progress.enable_steady_tick(Duration::from_millis(120));

    let result = download_tree(forge, project.id, ref_name, mirror_dir, &progress).await;
    progress.finish_and_clear();

    match result {
        Ok(stats) => {
            if stats.failures > 0 {
                println!(
                    "⚠️  Downloaded {} files in {} folders, {} failed",
                    stats.files, stats.directories, stats.failures
                );
            } else {
                println!("✅ Downloaded {} files in {} folders", stats.files, stats.directories);
            }
            Some(stats)
        }
        Err(e) => {
            println!("❌ Failed to download repository: {e:#}");
            None
        }
    }
}

fn report_commit_windows(commits: &[Commit], settings: &AuditSettings) {
    let since = settings.commits_since;
    let recent = commits_after(commits, since);

    match date_range(recent.iter().copied()) {
        Some((first, last)) => println!("\n📆 Commit date range after {since}: {first} to {last}"),
        None => {
            println!("\n📆 No commits found after {since}.");
            return;
        }
    }

    let (start, end) = (settings.window_start, settings.window_end);
    let window = commits_between(recent, start, end);
    if window.is_empty() {
        println!("No commits found between {start} and {end}.");
    } else {
        println!("Commits between {start} and {end}: {} commit(s) found.", window.len());
    }
}

async fn check_ci_status(forge: &dyn ForgeApi, project: &Project, ref_name: &str) -> Vec<Pipeline> {
    let pipelines = recover(forge.pipelines(project.id, ref_name).await, "Failed to retrieve pipelines");
    let Some(latest) = pipelines.first() else {
        println!("\nNo CI/CD pipelines found for branch '{ref_name}'.");
        return pipelines;
    };

    println!("\n🔧 CI/CD pipelines for branch '{ref_name}':");
    for pipeline in &pipelines {
        println!(
            "ID: {}, Status: {}, Created At: {}",
            pipeline.id,
            pipeline.status,
            pipeline.created_at.as_deref().unwrap_or("unknown")
        );
    }

    println!();
    if latest.succeeded() {
        print_banner("🟢 Latest CI/CD pipeline passed", STATUS_BANNER_WIDTH);
    } else {
        print_banner("🔴 Latest CI/CD pipeline failed", STATUS_BANNER_WIDTH);
    }

    pipelines
}

async fn analyze_latest_pipeline(forge: &dyn ForgeApi, project: &Project, latest: &Pipeline) -> TestTally {
    let report = recover(
        analyze_pipeline_logs(forge, project.id, latest.id).await,
        "Failed to retrieve pipeline jobs",
    );

    for job in &report.inspected {
        println!("Job ID: {}, Name: {}, Status: {}", job.id, job.name, job.status);
    }

    match &report.analyzed {
        Some((job, tally)) => {
            println!("Test analysis for job ID {}:", job.id);
            println!("  Total tests run: {}", tally.total);
            println!("  Tests passed: {}", tally.passed);
            println!("  Tests failed: {}", tally.failed);
        }
        None => println!("No job in pipeline {} produced a log.", latest.id),
    }

    report.tally()
}
