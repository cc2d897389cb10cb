// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for job execution and lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A job was dispatched for execution.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobStarted<'a> {
    pub job_id: &'a str,
    pub node: Option<&'a str>,
    pub command: &'a str,
}

impl Display for JobStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.node {
            Some(node) => write!(f, "Job '{}' started on node '{}'", self.job_id, node),
            None => write!(f, "Job '{}' started locally", self.job_id),
        }
    }
}

impl StructuredLog for JobStarted<'_> {
    fn log(&self) {
        tracing::info!(
            job_id = self.job_id,
            node = self.node.unwrap_or("local"),
            command = self.command,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job",
            span_name = name,
            job_id = self.job_id,
            node = self.node.unwrap_or("local"),
        )
    }
}

/// A job settled with a terminal status.
///
/// # Log Level
/// `info!` for passed jobs, `warn!` otherwise
pub struct JobSettled<'a> {
    pub job_id: &'a str,
    pub status: &'a crate::report::JobStatus,
    pub duration_ms: u64,
}

impl Display for JobSettled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' {} ({}ms)",
            self.job_id, self.status, self.duration_ms
        )
    }
}

impl StructuredLog for JobSettled<'_> {
    fn log(&self) {
        if self.status.is_passed() {
            tracing::info!(
                job_id = self.job_id,
                status = %self.status,
                duration_ms = self.duration_ms,
                "{}", self
            );
        } else {
            tracing::warn!(
                job_id = self.job_id,
                status = %self.status,
                duration_ms = self.duration_ms,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job_settled",
            span_name = name,
            job_id = self.job_id,
            status = %self.status,
        )
    }
}

/// A job was skipped without executing.
///
/// # Log Level
/// `warn!` - Unexpected but handled condition
pub struct JobSkipped<'a> {
    pub job_id: &'a str,
    pub cause: &'a crate::report::SkipCause,
}

impl Display for JobSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job '{}' skipped: {}", self.job_id, self.cause)
    }
}

impl StructuredLog for JobSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            job_id = self.job_id,
            cause = %self.cause,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "job_skipped",
            span_name = name,
            job_id = self.job_id,
            cause = %self.cause,
        )
    }
}
