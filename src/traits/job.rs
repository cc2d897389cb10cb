use async_trait::async_trait;

use crate::report::JobReport;

/// A single schedulable unit of work: one external command invocation.
///
/// Implementations are fully resolved at construction time (command template
/// substitution, node selection, timeout) so that `run` has no failure mode
/// of its own: every outcome, including a command that could not be spawned,
/// is expressed as a [`JobReport`].
#[async_trait]
pub trait Job: Send + Sync {
    /// Execute the job to completion and report what happened.
    async fn run(&self) -> JobReport;

    /// Job identifier from the configuration.
    fn id(&self) -> &str;

    /// The fully resolved command line, for dry runs and skip reports.
    fn command(&self) -> &str;

    /// Node the job runs on, if remote.
    fn node(&self) -> Option<&str> {
        None
    }

    /// Whether the job executes even when its dependencies did not succeed.
    ///
    /// This is the cleanup-job contract: once the job's dependencies have
    /// settled, it runs regardless of their outcome, under every failure
    /// strategy and after cancellation.
    fn always_run(&self) -> bool {
        false
    }
}
