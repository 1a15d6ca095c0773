//! Test count extraction from CI job logs
//!
//! Recognises the output of `cargo test`: the `running N tests` header, the
//! `test result:` summary, and individual `test name ... ok|FAILED` lines.

use regex::Regex;
use std::sync::OnceLock;

/// Test counts extracted from one job log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestTally {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
}

impl TestTally {
    pub fn new(total: u32, passed: u32, failed: u32) -> Self {
        Self { total, passed, failed }
    }
}

struct LogPatterns {
    running: Regex,
    summary_ok: Regex,
    single_ok: Regex,
    single_failed: Regex,
}

static PATTERNS: OnceLock<LogPatterns> = OnceLock::new();

fn patterns() -> &'static LogPatterns {
    PATTERNS.get_or_init(|| LogPatterns {
        running: Regex::new(r"running (\d+) tests").expect("valid regex"),
        summary_ok: Regex::new(r"test result: ok\. (\d+) passed; (\d+) failed").expect("valid regex"),
        single_ok: Regex::new(r"test .+ \.\.\. ok").expect("valid regex"),
        single_failed: Regex::new(r"test .+ \.\.\. FAILED").expect("valid regex"),
    })
}

/// Scans a job log line by line; the first matching rule wins for each line
///
/// - `running N tests` sets the total (a later header overwrites an earlier one)
/// - `test result: ok. P passed; F failed` adds P and F
/// - `test <name> ... ok` / `test <name> ... FAILED` add one each
///
/// When no header was seen the total is `passed + failed`.
pub fn analyze_test_results(log: &str) -> TestTally {
    let patterns = patterns();
    let mut tally = TestTally::default();

    for line in log.lines() {
        if let Some(caps) = patterns.running.captures(line) {
            if let Ok(total) = caps[1].parse::<u32>() {
                tally.total = total;
            }
        } else if let Some(caps) = patterns.summary_ok.captures(line) {
            if let (Ok(passed), Ok(failed)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
                tally.passed = tally.passed.saturating_add(passed);
                tally.failed = tally.failed.saturating_add(failed);
            }
        } else if patterns.single_ok.is_match(line) {
            tally.passed = tally.passed.saturating_add(1);
        } else if patterns.single_failed.is_match(line) {
            tally.failed = tally.failed.saturating_add(1);
        }
    }

    if tally.total == 0 {
        tally.total = tally.passed.saturating_add(tally.failed);
    }

    tally
}
