// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fmt;

/// How the engine reacts to a job failure.
///
/// Failure strategies only govern *scheduling*; the outcome of every job is
/// always recorded in the pipeline report, and jobs marked `always_run`
/// execute under every strategy once their dependencies have settled.
///
/// # Variants
/// * `FailFast` - stop scheduling ordinary jobs after the first failure
/// * `ContinueOnError` - keep running jobs whose own dependencies succeeded
/// * `BestEffort` - run every job whose dependencies have settled, regardless
///   of their outcome
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    #[default]
    FailFast,
    ContinueOnError,
    BestEffort,
}

/// Errors that can occur during pipeline execution.
///
/// Job failures are not errors at this level: a job that exits non-zero or
/// times out settles as `Failed`/`TimedOut` in the pipeline report. This
/// enum covers structural problems that prevent the engine from running the
/// graph at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The dependency graph references a job that isn't in the registry
    JobNotFound(String),
    /// Internal consistency error (e.g. a cycle that escaped validation)
    InternalError {
        /// Description of the inconsistency
        message: String,
    },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::JobNotFound(job_id) => {
                write!(f, "Job '{}' referenced in graph but not registered", job_id)
            }
            ExecutionError::InternalError { message } => {
                write!(f, "Internal execution error: {}", message)
            }
        }
    }
}

impl std::error::Error for ExecutionError {}
