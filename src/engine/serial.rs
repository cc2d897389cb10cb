//! Serial pipeline executor.
//!
//! Runs jobs strictly one at a time in topological order - the shape of a
//! CI workflow's gated job sequence. Because ranks are longest-path depths,
//! sorting by (rank, cleanup, id) is guaranteed to be a valid topological
//! order with the same tiebreaks the work queue uses, so the execution
//! order is a pure function of the configuration.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{DependencyGraph, EntryPoints, JobMap};
use crate::errors::{ExecutionError, FailureStrategy};
use crate::observability::messages::engine::{
    PipelineCancelled, PipelineCompleted, PipelineStarted, TopologicalSortFailed,
};
use crate::observability::messages::job::{JobSettled, JobSkipped, JobStarted};
use crate::observability::messages::StructuredLog;
use crate::report::{JobReport, PipelineReport, SkipCause};
use crate::traits::{Job, PipelineExecutor};

pub struct SerialExecutor;

impl SerialExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SerialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineExecutor for SerialExecutor {
    async fn execute_with_strategy(
        &self,
        jobs: JobMap,
        graph: DependencyGraph,
        _entrypoints: EntryPoints,
        failure_strategy: FailureStrategy,
        cancel: CancellationToken,
    ) -> Result<PipelineReport, ExecutionError> {
        let started = Instant::now();

        for job_id in graph.keys() {
            if !jobs.contains_key(job_id) {
                return Err(ExecutionError::JobNotFound(job_id.clone()));
            }
        }

        let (_, ranks) = match graph.dependency_counts_and_ranks() {
            Some(pair) => pair,
            None => {
                let msg = TopologicalSortFailed {
                    reason: "dependency graph contains cycles (should have been caught during config validation)",
                };
                msg.log();
                return Err(ExecutionError::InternalError {
                    message: msg.to_string(),
                });
            }
        };
        let reverse_dependencies = graph.build_reverse_dependencies();

        PipelineStarted {
            strategy: "serial",
            job_count: graph.len(),
            max_concurrency: 1,
        }
        .log();

        // Topological order: rank ascending, ordinary before cleanup, then id
        let mut order: Vec<&String> = graph.keys().collect();
        order.sort_by_key(|id| {
            let cleanup = jobs.get(id.as_str()).map(|j| j.always_run()).unwrap_or(false);
            (ranks.get(*id).copied().unwrap_or(0), cleanup, (*id).clone())
        });

        let mut reports: HashMap<String, JobReport> = HashMap::with_capacity(order.len());
        let mut pipeline_failed = false;
        let mut cancel_logged = false;

        for job_id in order {
            let job = jobs
                .get(job_id)
                .ok_or_else(|| ExecutionError::JobNotFound(job_id.clone()))?;

            let cancelled = cancel.is_cancelled();
            if cancelled && !cancel_logged {
                cancel_logged = true;
                PipelineCancelled {
                    pending_jobs: graph.len() - reports.len(),
                }
                .log();
            }

            if let Some(cause) =
                skip_cause(job, &reverse_dependencies, &reports, failure_strategy, cancelled, pipeline_failed)
            {
                JobSkipped {
                    job_id: job.id(),
                    cause: &cause,
                }
                .log();
                reports.insert(
                    job_id.clone(),
                    JobReport::skipped(job.id(), job.command(), job.node(), cause),
                );
                continue;
            }

            JobStarted {
                job_id: job.id(),
                node: job.node(),
                command: job.command(),
            }
            .log();

            let report = job.run().await;

            JobSettled {
                job_id: &report.job_id,
                status: &report.status,
                duration_ms: report.duration_ms,
            }
            .log();

            if report.status.is_failure() {
                pipeline_failed = true;
            }
            reports.insert(job_id.clone(), report);
        }

        let report = PipelineReport::new(reports, started.elapsed());
        let (passed, failed, skipped) = report.counts();
        PipelineCompleted {
            strategy: "serial",
            passed,
            failed,
            skipped,
            duration: started.elapsed(),
        }
        .log();

        Ok(report)
    }
}

/// Decide whether a job should be skipped, mirroring the work queue's
/// scheduling rules for the sequential case.
fn skip_cause(
    job: &std::sync::Arc<dyn Job>,
    reverse_dependencies: &HashMap<String, Vec<String>>,
    reports: &HashMap<String, JobReport>,
    failure_strategy: FailureStrategy,
    cancelled: bool,
    pipeline_failed: bool,
) -> Option<SkipCause> {
    if job.always_run() {
        return None;
    }
    if cancelled {
        return Some(SkipCause::Cancelled);
    }
    if failure_strategy == FailureStrategy::BestEffort {
        return None;
    }

    if let Some(dependencies) = reverse_dependencies.get(job.id()) {
        for dependency in dependencies {
            if let Some(dep_report) = reports.get(dependency) {
                if !dep_report.status.is_passed() {
                    return Some(SkipCause::DependencyFailed {
                        dependency: dependency.clone(),
                    });
                }
            }
        }
    }

    if failure_strategy == FailureStrategy::FailFast && pipeline_failed {
        return Some(SkipCause::PipelineFailed);
    }

    None
}
