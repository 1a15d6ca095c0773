//! grade-repo: audit one student assignment repository on a GitLab forge
//!
//! Authenticates, inspects branches, commits and files, mirrors the repository,
//! reads CI results and appends a summary line to the assignment's results file.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use goobits_grader::commands::handle_grade_command;
use goobits_grader::core::AuditSettings;
use goobits_grader::forge::GitLabClient;

const DEFAULT_LOG_FILTER: &str = "warn";
const VERBOSE_LOG_FILTER: &str = "goobits_grader=debug,grade_repo=debug,warn";

fn build_cli() -> ClapCommand {
    ClapCommand::new("grade-repo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Audit a student assignment repository and record its results")
        .arg(
            Arg::new("repo_url")
                .value_name("STUDENT_REPO_URL")
                .help("Repository URL, e.g. http://gitlab.example.edu/abc123-cse262/homework-2")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Settings file (default: <config dir>/goobits-grader/config.toml)"),
        )
        .arg(
            Arg::new("gitlab_url")
                .long("gitlab-url")
                .value_name("URL")
                .help("Forge URL, overrides GITLAB_URL and the settings file"),
        )
        .arg(
            Arg::new("ref")
                .long("ref")
                .value_name("BRANCH")
                .help("Audit this branch instead of the project's default branch"),
        )
        .arg(
            Arg::new("no_download")
                .long("no-download")
                .help("Skip mirroring the repository to disk")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Applies command-line overrides on top of file and environment settings
fn apply_cli_overrides(settings: &mut AuditSettings, matches: &ArgMatches) {
    if let Some(url) = matches.get_one::<String>("gitlab_url") {
        settings.gitlab_url = url.clone();
    }
    if let Some(ref_name) = matches.get_one::<String>("ref") {
        settings.ref_override = Some(ref_name.clone());
    }
    if matches.get_flag("no_download") {
        settings.download = false;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let repo_url = matches
        .get_one::<String>("repo_url")
        .context("missing repository URL")?;

    let mut settings = AuditSettings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    apply_cli_overrides(&mut settings, &matches);
    settings.validate()?;

    let client = GitLabClient::new(&settings.gitlab_url, settings.token()?, settings.request_timeout())
        .context("An error occurred while connecting to GitLab")?;
    info!(forge = %client.api_base(), "forge client ready");

    handle_grade_command(&client, &settings, repo_url).await?;

    Ok(())
}
