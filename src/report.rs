// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-job and pipeline status reports.
//!
//! The report is the product of a pipeline run: every job settles with
//! exactly one [`JobStatus`], and the collected [`PipelineReport`] is what
//! gets rendered to the terminal and optionally written out as JSON.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Why a job was skipped without executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCause {
    /// A direct or transitive dependency failed, timed out, or was skipped
    DependencyFailed {
        /// The dependency whose outcome caused the skip
        dependency: String,
    },
    /// The pipeline stopped scheduling ordinary jobs (fail-fast)
    PipelineFailed,
    /// The run was cancelled before the job became ready
    Cancelled,
}

impl std::fmt::Display for SkipCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipCause::DependencyFailed { dependency } => {
                write!(f, "dependency '{}' did not succeed", dependency)
            }
            SkipCause::PipelineFailed => write!(f, "pipeline already failed"),
            SkipCause::Cancelled => write!(f, "run cancelled"),
        }
    }
}

/// Terminal state of a job.
///
/// `Failed` and `TimedOut` make the pipeline fail; `Skipped` does not, it
/// only records that the job never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum JobStatus {
    /// The command exited with status zero
    Passed,
    /// The command exited non-zero, or could not be spawned (no exit code)
    Failed { exit_code: Option<i32> },
    /// The command was killed after exceeding its timeout
    TimedOut { timeout_seconds: u64 },
    /// The job never executed
    Skipped { cause: SkipCause },
}

impl JobStatus {
    /// True when the job ran and exited cleanly.
    pub fn is_passed(&self) -> bool {
        matches!(self, JobStatus::Passed)
    }

    /// True when the job ran and did not exit cleanly.
    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed { .. } | JobStatus::TimedOut { .. })
    }

    /// True when the job never executed.
    pub fn is_skipped(&self) -> bool {
        matches!(self, JobStatus::Skipped { .. })
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Passed => write!(f, "passed"),
            JobStatus::Failed {
                exit_code: Some(code),
            } => write!(f, "failed (exit code {})", code),
            JobStatus::Failed { exit_code: None } => write!(f, "failed (no exit code)"),
            JobStatus::TimedOut { timeout_seconds } => {
                write!(f, "timed out after {}s", timeout_seconds)
            }
            JobStatus::Skipped { cause } => write!(f, "skipped: {}", cause),
        }
    }
}

/// Everything recorded about a single settled job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    /// Job identifier from the configuration
    pub job_id: String,
    /// Terminal state
    pub status: JobStatus,
    /// Wall-clock execution time in milliseconds (0 for skipped jobs)
    pub duration_ms: u64,
    /// The fully resolved command, as executed
    pub command: String,
    /// Node the command ran on, if remote
    pub node: Option<String>,
    /// Tail of captured stdout
    pub stdout_tail: String,
    /// Tail of captured stderr
    pub stderr_tail: String,
}

impl JobReport {
    /// Report for a job that was skipped without executing.
    pub fn skipped(job_id: &str, command: &str, node: Option<&str>, cause: SkipCause) -> Self {
        Self {
            job_id: job_id.to_string(),
            status: JobStatus::Skipped { cause },
            duration_ms: 0,
            command: command.to_string(),
            node: node.map(str::to_string),
            stdout_tail: String::new(),
            stderr_tail: String::new(),
        }
    }

}

/// Collected results of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Settled jobs, keyed by job ID
    pub jobs: HashMap<String, JobReport>,
    /// Total wall-clock time for the run in milliseconds
    pub elapsed_ms: u64,
}

impl PipelineReport {
    pub fn new(jobs: HashMap<String, JobReport>, elapsed: Duration) -> Self {
        Self {
            jobs,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// True when no executed job failed or timed out.
    pub fn passed(&self) -> bool {
        self.jobs.values().all(|r| !r.status.is_failure())
    }

    /// Counts of (passed, failed, skipped) jobs. Timed-out jobs count as failed.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for report in self.jobs.values() {
            if report.status.is_passed() {
                passed += 1;
            } else if report.status.is_failure() {
                failed += 1;
            } else {
                skipped += 1;
            }
        }
        (passed, failed, skipped)
    }

    /// Reports sorted by job ID, for stable rendering.
    pub fn sorted(&self) -> Vec<&JobReport> {
        let mut reports: Vec<&JobReport> = self.jobs.values().collect();
        reports.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passed(id: &str) -> JobReport {
        JobReport {
            job_id: id.to_string(),
            status: JobStatus::Passed,
            duration_ms: 12,
            command: "true".to_string(),
            node: None,
            stdout_tail: String::new(),
            stderr_tail: String::new(),
        }
    }

    #[test]
    fn skipped_jobs_do_not_fail_the_pipeline() {
        let mut jobs = HashMap::new();
        jobs.insert("a".to_string(), passed("a"));
        jobs.insert(
            "b".to_string(),
            JobReport::skipped("b", "true", None, SkipCause::PipelineFailed),
        );

        let report = PipelineReport::new(jobs, Duration::from_millis(50));
        assert!(report.passed());
        assert_eq!(report.counts(), (1, 0, 1));
    }

    #[test]
    fn timed_out_jobs_fail_the_pipeline() {
        let mut jobs = HashMap::new();
        let mut timed_out = passed("slow");
        timed_out.status = JobStatus::TimedOut { timeout_seconds: 5 };
        jobs.insert("slow".to_string(), timed_out);

        let report = PipelineReport::new(jobs, Duration::from_secs(5));
        assert!(!report.passed());
        assert_eq!(report.counts(), (0, 1, 0));
    }

    #[test]
    fn status_display_is_human_readable() {
        assert_eq!(JobStatus::Passed.to_string(), "passed");
        assert_eq!(
            JobStatus::Failed { exit_code: Some(3) }.to_string(),
            "failed (exit code 3)"
        );
        assert_eq!(
            JobStatus::TimedOut { timeout_seconds: 30 }.to_string(),
            "timed out after 30s"
        );
        assert_eq!(
            JobStatus::Skipped {
                cause: SkipCause::Cancelled
            }
            .to_string(),
            "skipped: run cancelled"
        );
    }

    #[test]
    fn report_serializes_to_json() {
        let report = passed("build");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["job_id"], "build");
        assert_eq!(json["status"]["outcome"], "passed");
    }

    #[test]
    fn sorted_orders_by_job_id() {
        let mut jobs = HashMap::new();
        for id in ["c", "a", "b"] {
            jobs.insert(id.to_string(), passed(id));
        }
        let report = PipelineReport::new(jobs, Duration::ZERO);
        let ids: Vec<&str> = report.sorted().iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
