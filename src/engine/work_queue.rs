//! Work queue pipeline executor with dependency counting.
//!
//! This is the concurrent execution strategy: jobs whose dependencies have
//! all settled enter a deterministic ready queue, and up to
//! `max_concurrency` of them run at once as tokio tasks. Dependency counting
//! makes readiness resolution O(1) per settled job.
//!
//! # Settling
//!
//! Every job settles exactly once, into one of four terminal states: it
//! passed, it failed (non-zero exit or spawn error), it timed out, or it was
//! skipped without executing. Skips cascade: a job whose dependency did not
//! succeed settles as skipped immediately, which in turn releases *its*
//! dependents. This keeps the completion condition simple - the run is over
//! when every job in the graph has settled.
//!
//! # Always-run jobs
//!
//! Jobs marked `always_run` are the exception to skip cascading: once their
//! dependencies have settled they execute no matter how those dependencies
//! fared, under every failure strategy and after cancellation. This is the
//! cleanup contract: a node teardown step runs whether or not the tests it
//! follows ever got the chance to.
//!
//! # Failure strategies
//!
//! * `FailFast` - after the first failure, ordinary jobs settle as skipped
//!   as they surface; `always_run` jobs still execute.
//! * `ContinueOnError` - independent subgraphs keep running; only the failed
//!   job's downstream is skipped.
//! * `BestEffort` - dependency outcomes are ignored; every job runs once its
//!   dependencies have settled.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{DependencyGraph, EntryPoints, JobMap};
use crate::engine::ready_queue::{ReadyQueue, ReadyTask};
use crate::errors::{ExecutionError, FailureStrategy};
use crate::observability::messages::engine::{
    PipelineCancelled, PipelineCompleted, PipelineStarted, TopologicalSortFailed,
};
use crate::observability::messages::job::{JobSettled, JobSkipped, JobStarted};
use crate::observability::messages::StructuredLog;
use crate::report::{JobReport, PipelineReport, SkipCause};
use crate::traits::{Job, PipelineExecutor};

/// Shared mutable state for one pipeline run.
///
/// Everything behind one `Arc` so spawned tasks clone a single handle
/// instead of a fistful of them.
struct RunState {
    /// Remaining unsettled-dependency counts, decremented as jobs settle
    counts: Mutex<HashMap<String, usize>>,
    /// Jobs whose dependencies have all settled, in scheduling order
    queue: Mutex<ReadyQueue>,
    /// Settled jobs
    reports: Mutex<HashMap<String, JobReport>>,
    /// Number of jobs currently executing
    active: Mutex<usize>,
    /// Set once any job fails or times out
    pipeline_failed: Mutex<bool>,
}

/// Immutable context shared by the scheduler and its spawned tasks.
struct RunContext {
    jobs: JobMap,
    /// id -> dependents
    graph: HashMap<String, Vec<String>>,
    /// id -> its dependencies, sorted
    reverse_dependencies: HashMap<String, Vec<String>>,
    ranks: HashMap<String, usize>,
}

/// Settle one job: record its report and release any dependents whose last
/// dependency this was.
async fn settle(state: &RunState, ctx: &RunContext, report: JobReport) {
    let job_id = report.job_id.clone();
    let failed = report.status.is_failure();

    {
        let mut reports = state.reports.lock().await;
        reports.insert(job_id.clone(), report);
    }
    if failed {
        let mut pipeline_failed = state.pipeline_failed.lock().await;
        *pipeline_failed = true;
    }

    if let Some(dependents) = ctx.graph.get(&job_id) {
        let mut counts = state.counts.lock().await;
        let mut queue = state.queue.lock().await;
        for dependent in dependents {
            if let Some(count) = counts.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    let rank = ctx.ranks.get(dependent).copied().unwrap_or(0);
                    let cleanup = ctx
                        .jobs
                        .get(dependent)
                        .map(|j| j.always_run())
                        .unwrap_or(false);
                    queue.push(ReadyTask::new(dependent.clone(), rank, cleanup));
                }
            }
        }
    }
}

/// What the scheduler decided to do with a ready job.
enum Decision {
    Run,
    Skip(SkipCause),
}

/// Apply the failure strategy, cancellation state, and dependency outcomes
/// to a ready job. `always_run` jobs always run; that is the whole point.
async fn decide(
    state: &RunState,
    ctx: &RunContext,
    job: &Arc<dyn Job>,
    failure_strategy: FailureStrategy,
    cancelled: bool,
) -> Decision {
    if job.always_run() {
        return Decision::Run;
    }
    if cancelled {
        return Decision::Skip(SkipCause::Cancelled);
    }
    if failure_strategy == FailureStrategy::BestEffort {
        return Decision::Run;
    }

    // All dependencies have settled (the job would not be ready otherwise);
    // any that did not pass blocks an ordinary job.
    if let Some(dependencies) = ctx.reverse_dependencies.get(job.id()) {
        let reports = state.reports.lock().await;
        for dependency in dependencies {
            if let Some(dep_report) = reports.get(dependency) {
                if !dep_report.status.is_passed() {
                    return Decision::Skip(SkipCause::DependencyFailed {
                        dependency: dependency.clone(),
                    });
                }
            }
        }
    }

    if failure_strategy == FailureStrategy::FailFast && *state.pipeline_failed.lock().await {
        return Decision::Skip(SkipCause::PipelineFailed);
    }

    Decision::Run
}

/// Work queue executor with dependency counting and bounded concurrency.
pub struct WorkQueueExecutor {
    /// Maximum number of concurrent job executions.
    max_concurrency: usize,
}

impl WorkQueueExecutor {
    /// Creates a new work queue executor with the specified concurrency limit.
    ///
    /// The limit is clamped to a minimum of 1.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }
}

impl Default for WorkQueueExecutor {
    /// Concurrency defaults to the number of available CPU cores, falling
    /// back to 4 if detection fails.
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(concurrency)
    }
}

#[async_trait]
impl PipelineExecutor for WorkQueueExecutor {
    async fn execute_with_strategy(
        &self,
        jobs: JobMap,
        graph: DependencyGraph,
        entrypoints: EntryPoints,
        failure_strategy: FailureStrategy,
        cancel: CancellationToken,
    ) -> Result<PipelineReport, ExecutionError> {
        let started = Instant::now();

        // === PHASE 1: VALIDATION AND SETUP ===

        // Every job referenced by the graph must exist in the registry
        for job_id in graph.keys() {
            if !jobs.contains_key(job_id) {
                return Err(ExecutionError::JobNotFound(job_id.clone()));
            }
        }

        let reverse_dependencies = graph.build_reverse_dependencies();
        let (dependency_counts, ranks) = match graph.dependency_counts_and_ranks() {
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

        let total_jobs = graph.len();
        PipelineStarted {
            strategy: "work_queue",
            job_count: total_jobs,
            max_concurrency: self.max_concurrency,
        }
        .log();

        // === PHASE 2: READY QUEUE INITIALIZATION ===

        let mut queue = ReadyQueue::new();
        for entrypoint in entrypoints.iter() {
            let rank = ranks.get(entrypoint).copied().unwrap_or(0);
            let cleanup = jobs
                .get(entrypoint)
                .map(|j| j.always_run())
                .unwrap_or(false);
            queue.push(ReadyTask::new(entrypoint.clone(), rank, cleanup));
        }

        // === PHASE 3: SHARED STATE FOR CONCURRENT EXECUTION ===

        let state = Arc::new(RunState {
            counts: Mutex::new(dependency_counts),
            queue: Mutex::new(queue),
            reports: Mutex::new(HashMap::with_capacity(total_jobs)),
            active: Mutex::new(0),
            pipeline_failed: Mutex::new(false),
        });
        let ctx = Arc::new(RunContext {
            jobs,
            graph: graph.0.clone(),
            reverse_dependencies,
            ranks,
        });
        let mut cancel_logged = false;

        // === PHASE 4: MAIN SCHEDULING LOOP ===

        loop {
            let cancelled = cancel.is_cancelled();
            if cancelled && !cancel_logged {
                cancel_logged = true;
                let settled = state.reports.lock().await.len();
                PipelineCancelled {
                    pending_jobs: total_jobs - settled,
                }
                .log();
            }

            // Pop the next ready job if a concurrency slot is free
            let next_task = {
                let mut queue = state.queue.lock().await;
                let active = *state.active.lock().await;
                if active < self.max_concurrency {
                    queue.pop()
                } else {
                    None
                }
            };

            match next_task {
                Some(task) => {
                    let job = match ctx.jobs.get(&task.job_id) {
                        Some(job) => job.clone(),
                        None => return Err(ExecutionError::JobNotFound(task.job_id)),
                    };

                    match decide(&state, &ctx, &job, failure_strategy, cancelled).await {
                        Decision::Skip(cause) => {
                            JobSkipped {
                                job_id: job.id(),
                                cause: &cause,
                            }
                            .log();
                            let report =
                                JobReport::skipped(job.id(), job.command(), job.node(), cause);
                            // Settling inline cascades the skip to dependents
                            settle(&state, &ctx, report).await;
                        }
                        Decision::Run => {
                            {
                                let mut active = state.active.lock().await;
                                *active += 1;
                            }

                            let state_clone = state.clone();
                            let ctx_clone = ctx.clone();
                            tokio::spawn(async move {
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

                                settle(&state_clone, &ctx_clone, report).await;

                                let mut active = state_clone.active.lock().await;
                                *active -= 1;
                            });
                        }
                    }
                }
                None => {
                    // === COMPLETION CHECK ===
                    let active = *state.active.lock().await;
                    let queue_empty = state.queue.lock().await.is_empty();
                    let settled = state.reports.lock().await.len();

                    if active == 0 && queue_empty {
                        if settled == total_jobs {
                            break;
                        }
                        // Nothing running, nothing ready, jobs unsettled:
                        // the graph is inconsistent with the registry
                        return Err(ExecutionError::InternalError {
                            message: format!(
                                "pipeline stalled with {} of {} jobs settled",
                                settled, total_jobs
                            ),
                        });
                    }

                    // Concurrency limit reached or tasks in flight - wait briefly
                    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                }
            }
        }

        // === PHASE 5: REPORT EXTRACTION ===

        let reports = state.reports.lock().await.clone();
        let report = PipelineReport::new(reports, started.elapsed());
        let (passed, failed, skipped) = report.counts();
        PipelineCompleted {
            strategy: "work_queue",
            passed,
            failed,
            skipped,
            duration: started.elapsed(),
        }
        .log();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::integration_tests::support::{order_of, TestJob, TestOutcome};
    use crate::report::JobStatus;

    fn graph_of(edges: &[(&str, &[&str])]) -> DependencyGraph {
        DependencyGraph::from(
            edges
                .iter()
                .map(|(id, deps)| {
                    (
                        id.to_string(),
                        deps.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
                    )
                })
                .collect::<HashMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn single_job_runs_and_passes() {
        let (jobs, log) = TestJob::registry(&[("only", TestOutcome::Pass, false, 0)]);
        let graph = graph_of(&[("only", &[])]);
        let entrypoints = EntryPoints::from(vec!["only".to_string()]);

        let executor = WorkQueueExecutor::new(2);
        let report = executor.execute(jobs, graph, entrypoints).await.unwrap();

        assert!(report.passed());
        assert_eq!(report.jobs.len(), 1);
        assert_eq!(order_of(&log), vec!["only"]);
    }

    #[tokio::test]
    async fn linear_chain_executes_in_order() {
        let (jobs, log) = TestJob::registry(&[
            ("setup", TestOutcome::Pass, false, 0),
            ("build", TestOutcome::Pass, false, 0),
            ("run", TestOutcome::Pass, false, 0),
        ]);
        let graph = graph_of(&[("setup", &["build"]), ("build", &["run"]), ("run", &[])]);
        let entrypoints = EntryPoints::from(vec!["setup".to_string()]);

        let executor = WorkQueueExecutor::new(4);
        let report = executor.execute(jobs, graph, entrypoints).await.unwrap();

        assert!(report.passed());
        assert_eq!(order_of(&log), vec!["setup", "build", "run"]);
    }

    #[tokio::test]
    async fn missing_job_is_a_structural_error() {
        let (jobs, _log) = TestJob::registry(&[("present", TestOutcome::Pass, false, 0)]);
        let graph = graph_of(&[("present", &["ghost"]), ("ghost", &[])]);
        let entrypoints = EntryPoints::from(vec!["present".to_string()]);

        let executor = WorkQueueExecutor::new(2);
        let result = executor.execute(jobs, graph, entrypoints).await;

        assert_eq!(
            result.unwrap_err(),
            ExecutionError::JobNotFound("ghost".to_string())
        );
    }

    #[tokio::test]
    async fn failure_skips_downstream_but_not_cleanup() {
        let (jobs, log) = TestJob::registry(&[
            ("build", TestOutcome::Fail(1), false, 0),
            ("run", TestOutcome::Pass, false, 0),
            ("cleanup", TestOutcome::Pass, true, 0),
        ]);
        let graph = graph_of(&[("build", &["run"]), ("run", &["cleanup"]), ("cleanup", &[])]);
        let entrypoints = EntryPoints::from(vec!["build".to_string()]);

        let executor = WorkQueueExecutor::new(2);
        let report = executor.execute(jobs, graph, entrypoints).await.unwrap();

        assert!(!report.passed());
        assert_eq!(
            report.jobs["build"].status,
            JobStatus::Failed { exit_code: Some(1) }
        );
        assert!(report.jobs["run"].status.is_skipped());
        // Cleanup executed despite the failure upstream
        assert_eq!(report.jobs["cleanup"].status, JobStatus::Passed);
        assert_eq!(order_of(&log), vec!["build", "cleanup"]);
    }

    #[tokio::test]
    async fn diamond_converges_after_both_branches() {
        let (jobs, log) = TestJob::registry(&[
            ("root", TestOutcome::Pass, false, 0),
            ("left", TestOutcome::Pass, false, 20),
            ("right", TestOutcome::Pass, false, 5),
            ("merge", TestOutcome::Pass, false, 0),
        ]);
        let graph = graph_of(&[
            ("root", &["left", "right"]),
            ("left", &["merge"]),
            ("right", &["merge"]),
            ("merge", &[]),
        ]);
        let entrypoints = EntryPoints::from(vec!["root".to_string()]);

        let executor = WorkQueueExecutor::new(4);
        let report = executor.execute(jobs, graph, entrypoints).await.unwrap();

        assert!(report.passed());
        let order = order_of(&log);
        assert_eq!(order.first().map(String::as_str), Some("root"));
        assert_eq!(order.last().map(String::as_str), Some("merge"));
        assert_eq!(order.len(), 4);
    }

    #[tokio::test]
    async fn pre_cancelled_run_skips_ordinary_jobs_but_runs_cleanup() {
        let (jobs, log) = TestJob::registry(&[
            ("work", TestOutcome::Pass, false, 0),
            ("teardown", TestOutcome::Pass, true, 0),
        ]);
        let graph = graph_of(&[("work", &["teardown"]), ("teardown", &[])]);
        let entrypoints = EntryPoints::from(vec!["work".to_string()]);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let executor = WorkQueueExecutor::new(2);
        let report = executor
            .execute_with_strategy(jobs, graph, entrypoints, FailureStrategy::FailFast, cancel)
            .await
            .unwrap();

        assert_eq!(
            report.jobs["work"].status,
            JobStatus::Skipped {
                cause: SkipCause::Cancelled
            }
        );
        assert_eq!(report.jobs["teardown"].status, JobStatus::Passed);
        assert_eq!(order_of(&log), vec!["teardown"]);
    }
}
