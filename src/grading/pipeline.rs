//! CI pipeline inspection

use tracing::warn;

use super::ci_log::{analyze_test_results, TestTally};
use crate::forge::{ForgeApi, ForgeError, Job};

/// Jobs whose name mentions `test` (any case) and that finished successfully
pub fn count_passed_test_jobs(jobs: &[Job]) -> usize {
    jobs.iter()
        .filter(|job| job.name.to_lowercase().contains("test") && job.status == "success")
        .count()
}

/// Passed test jobs in the newest pipeline for `ref_name`; zero without pipelines
pub async fn passed_test_jobs_in_latest(
    forge: &dyn ForgeApi,
    project_id: u64,
    ref_name: &str,
) -> Result<usize, ForgeError> {
    let pipelines = forge.pipelines(project_id, ref_name).await?;
    let Some(latest) = pipelines.first() else {
        return Ok(0);
    };

    let jobs = forge.pipeline_jobs(project_id, latest.id).await?;
    Ok(count_passed_test_jobs(&jobs))
}

/// Outcome of scanning a pipeline's job logs
#[derive(Clone, Debug, Default)]
pub struct PipelineLogReport {
    /// Jobs fetched, in listing order, up to and including the analyzed one
    pub inspected: Vec<Job>,
    /// The first job that produced a log, with its test counts
    pub analyzed: Option<(Job, TestTally)>,
}

impl PipelineLogReport {
    pub fn tally(&self) -> TestTally {
        self.analyzed.as_ref().map(|(_, tally)| *tally).unwrap_or_default()
    }
}

/// Walks the pipeline's jobs and scans the first non-empty log
///
/// A job that cannot be fetched is logged and skipped.
pub async fn analyze_pipeline_logs(
    forge: &dyn ForgeApi,
    project_id: u64,
    pipeline_id: u64,
) -> Result<PipelineLogReport, ForgeError> {
    let jobs = forge.pipeline_jobs(project_id, pipeline_id).await?;
    let mut report = PipelineLogReport::default();

    for listed in jobs {
        let job = match forge.job(project_id, listed.id).await {
            Ok(job) => job,
            Err(e) => {
                warn!(job = listed.id, error = %e, "failed to fetch job");
                continue;
            }
        };
        report.inspected.push(job.clone());

        let trace = match forge.job_trace(project_id, job.id).await {
            Ok(trace) => trace,
            Err(e) => {
                warn!(job = job.id, error = %e, "failed to fetch job log");
                continue;
            }
        };
        if trace.is_empty() {
            continue;
        }

        let log = String::from_utf8_lossy(&trace);
        let tally = analyze_test_results(&log);
        report.analyzed = Some((job, tally));
        break;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str, status: &str) -> Job {
        Job {
            id: 1,
            name: name.to_string(),
            status: status.to_string(),
            stage: "test".to_string(),
        }
    }

    #[test]
    fn test_count_passed_test_jobs() {
        let jobs = vec![
            job("cargo-test", "success"),
            job("Unit Tests", "success"),
            job("test:integration", "failed"),
            job("build", "success"),
            job("lint", "ok"),
        ];
        assert_eq!(count_passed_test_jobs(&jobs), 2);
    }

    #[test]
    fn test_report_tally_defaults_to_zero() {
        assert_eq!(PipelineLogReport::default().tally(), TestTally::default());
    }
}
