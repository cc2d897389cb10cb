use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{DependencyGraph, EntryPoints, JobMap};
use crate::errors::{ExecutionError, FailureStrategy};
use crate::report::PipelineReport;

#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    /// Execute a pipeline given jobs and their dependency graph.
    ///
    /// - `jobs`: registry mapping id -> job instance
    /// - `graph`: adjacency list (id -> list of dependents)
    /// - `entrypoints`: jobs with no dependencies
    ///
    /// Job failures are not errors at this level: every job settles into the
    /// returned [`PipelineReport`], and `Err` is reserved for structural
    /// problems (unknown job, cycle that escaped validation).
    async fn execute(
        &self,
        jobs: JobMap,
        graph: DependencyGraph,
        entrypoints: EntryPoints,
    ) -> Result<PipelineReport, ExecutionError> {
        self.execute_with_strategy(
            jobs,
            graph,
            entrypoints,
            FailureStrategy::default(),
            CancellationToken::new(),
        )
        .await
    }

    /// Execute with a specific failure handling strategy and cancellation.
    ///
    /// Cancelling the token stops the engine from launching new ordinary
    /// jobs; in-flight jobs finish (or time out) and `always_run` jobs still
    /// execute before the partial report is returned.
    async fn execute_with_strategy(
        &self,
        jobs: JobMap,
        graph: DependencyGraph,
        entrypoints: EntryPoints,
        failure_strategy: FailureStrategy,
        cancel: CancellationToken,
    ) -> Result<PipelineReport, ExecutionError>;
}
