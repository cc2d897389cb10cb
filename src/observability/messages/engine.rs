// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline executor lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Pipeline execution lifecycle (start, completion, cancellation)
//! * Execution strategy selection
//! * Concurrency and scheduling

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline execution started with specified strategy and configuration.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineStarted<'a> {
    pub strategy: &'a str,
    pub job_count: usize,
    pub max_concurrency: usize,
}

impl Display for PipelineStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting pipeline with {} strategy: {} jobs, max_concurrency={}",
            self.strategy, self.job_count, self.max_concurrency
        )
    }
}

impl StructuredLog for PipelineStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            job_count = self.job_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline",
            span_name = name,
            strategy = self.strategy,
            job_count = self.job_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Pipeline execution finished; all jobs settled.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineCompleted<'a> {
    pub strategy: &'a str,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: std::time::Duration,
}

impl Display for PipelineCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline completed with {} strategy: {} passed, {} failed, {} skipped in {:?}",
            self.strategy, self.passed, self.failed, self.skipped, self.duration
        )
    }
}

impl StructuredLog for PipelineCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            passed = self.passed,
            failed = self.failed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_completed",
            span_name = name,
            strategy = self.strategy,
            passed = self.passed,
            failed = self.failed,
            skipped = self.skipped,
            duration = ?self.duration,
        )
    }
}

/// Cancellation observed; only always-run jobs will still execute.
///
/// # Log Level
/// `warn!` - Unexpected but handled condition
pub struct PipelineCancelled {
    pub pending_jobs: usize,
}

impl Display for PipelineCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline cancelled: {} pending jobs will be skipped (cleanup jobs still run)",
            self.pending_jobs
        )
    }
}

impl StructuredLog for PipelineCancelled {
    fn log(&self) {
        tracing::warn!(pending_jobs = self.pending_jobs, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "pipeline_cancelled",
            span_name = name,
            pending_jobs = self.pending_jobs,
        )
    }
}

/// Topological sort failed (cyclic dependency detected).
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TopologicalSortFailed<'a> {
    pub reason: &'a str,
}

impl Display for TopologicalSortFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Topological sort failed: {}", self.reason)
    }
}

impl StructuredLog for TopologicalSortFailed<'_> {
    fn log(&self) {
        tracing::error!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "topological_sort_failed",
            span_name = name,
            reason = self.reason,
        )
    }
}
