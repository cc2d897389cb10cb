//! End-to-end engine tests driving both executors through realistic
//! pipeline shapes with scripted jobs.

/// Scripted [`Job`](crate::traits::Job) implementation and helpers shared by
/// the engine test modules.
pub mod support {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::config::JobMap;
    use crate::report::{JobReport, JobStatus};
    use crate::traits::Job;

    /// What a scripted job should pretend happened.
    #[derive(Debug, Clone, Copy)]
    pub enum TestOutcome {
        Pass,
        Fail(i32),
        TimeOut(u64),
    }

    /// A job that sleeps, records its execution, and reports a scripted
    /// outcome.
    pub struct TestJob {
        id: String,
        outcome: TestOutcome,
        always_run: bool,
        delay_ms: u64,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TestJob {
        /// Build a registry of scripted jobs plus the shared execution log.
        ///
        /// Each entry is `(id, outcome, always_run, delay_ms)`.
        pub fn registry(
            specs: &[(&str, TestOutcome, bool, u64)],
        ) -> (JobMap, Arc<Mutex<Vec<String>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut map: HashMap<String, Arc<dyn Job>> = HashMap::new();
            for (id, outcome, always_run, delay_ms) in specs {
                map.insert(
                    id.to_string(),
                    Arc::new(TestJob {
                        id: id.to_string(),
                        outcome: *outcome,
                        always_run: *always_run,
                        delay_ms: *delay_ms,
                        log: log.clone(),
                    }),
                );
            }
            (JobMap::from(map), log)
        }
    }

    /// The IDs of jobs that actually executed, in execution order.
    pub fn order_of(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[async_trait]
    impl Job for TestJob {
        async fn run(&self) -> JobReport {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.log.lock().unwrap().push(self.id.clone());

            let status = match self.outcome {
                TestOutcome::Pass => JobStatus::Passed,
                TestOutcome::Fail(code) => JobStatus::Failed {
                    exit_code: Some(code),
                },
                TestOutcome::TimeOut(timeout_seconds) => JobStatus::TimedOut { timeout_seconds },
            };

            JobReport {
                job_id: self.id.clone(),
                status,
                duration_ms: self.delay_ms,
                command: format!("test:{}", self.id),
                node: None,
                stdout_tail: String::new(),
                stderr_tail: String::new(),
            }
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn command(&self) -> &str {
            "test"
        }

        fn always_run(&self) -> bool {
            self.always_run
        }
    }
}

mod two_node_pipeline {
    use super::support::{order_of, TestJob, TestOutcome};
    use crate::config::{DependencyGraph, EntryPoints};
    use crate::engine::{SerialExecutor, WorkQueueExecutor};
    use crate::errors::FailureStrategy;
    use crate::report::{JobStatus, SkipCause};
    use crate::traits::PipelineExecutor;
    use std::collections::HashMap;
    use tokio_util::sync::CancellationToken;

    /// The canonical nightly shape: per-node setup -> build -> run, a final
    /// check gated on both nodes, and per-node cleanup that always runs.
    fn nightly_specs(
        build_server: TestOutcome,
    ) -> Vec<(&'static str, TestOutcome, bool, u64)> {
        vec![
            ("setup-server", TestOutcome::Pass, false, 0),
            ("setup-client", TestOutcome::Pass, false, 0),
            ("build-server", build_server, false, 0),
            ("build-client", TestOutcome::Pass, false, 0),
            ("run-echo", TestOutcome::Pass, false, 0),
            ("cleanup-server", TestOutcome::Pass, true, 0),
            ("cleanup-client", TestOutcome::Pass, true, 0),
        ]
    }

    fn nightly_graph() -> DependencyGraph {
        let edges: HashMap<String, Vec<String>> = [
            ("setup-server", vec!["build-server"]),
            ("setup-client", vec!["build-client"]),
            ("build-server", vec!["run-echo"]),
            ("build-client", vec!["run-echo"]),
            ("run-echo", vec!["cleanup-server", "cleanup-client"]),
            ("cleanup-server", vec![]),
            ("cleanup-client", vec![]),
        ]
        .into_iter()
        .map(|(id, deps)| {
            (
                id.to_string(),
                deps.into_iter().map(String::from).collect(),
            )
        })
        .collect();
        DependencyGraph::from(edges)
    }

    fn entrypoints() -> EntryPoints {
        EntryPoints::from(vec!["setup-server".to_string(), "setup-client".to_string()])
    }

    #[tokio::test]
    async fn healthy_nightly_passes_on_both_executors() {
        for serial in [false, true] {
            let (jobs, log) = TestJob::registry(&nightly_specs(TestOutcome::Pass));
            let executor: Box<dyn PipelineExecutor> = if serial {
                Box::new(SerialExecutor::new())
            } else {
                Box::new(WorkQueueExecutor::new(4))
            };

            let report = executor
                .execute(jobs, nightly_graph(), entrypoints())
                .await
                .unwrap();

            assert!(report.passed(), "serial={}", serial);
            assert_eq!(report.jobs.len(), 7);
            let order = order_of(&log);
            assert_eq!(order.len(), 7);
            // run-echo is gated on both builds
            let pos = |id: &str| order.iter().position(|j| j == id).unwrap();
            assert!(pos("run-echo") > pos("build-server"));
            assert!(pos("run-echo") > pos("build-client"));
            // cleanup comes last
            assert!(pos("cleanup-server") > pos("run-echo"));
            assert!(pos("cleanup-client") > pos("run-echo"));
        }
    }

    #[tokio::test]
    async fn broken_build_still_cleans_up_both_nodes() {
        for serial in [false, true] {
            let (jobs, log) = TestJob::registry(&nightly_specs(TestOutcome::Fail(101)));
            let executor: Box<dyn PipelineExecutor> = if serial {
                Box::new(SerialExecutor::new())
            } else {
                Box::new(WorkQueueExecutor::new(4))
            };

            let report = executor
                .execute_with_strategy(
                    jobs,
                    nightly_graph(),
                    entrypoints(),
                    FailureStrategy::FailFast,
                    CancellationToken::new(),
                )
                .await
                .unwrap();

            assert!(!report.passed(), "serial={}", serial);
            assert_eq!(
                report.jobs["build-server"].status,
                JobStatus::Failed {
                    exit_code: Some(101)
                }
            );
            // The gated run is skipped because a dependency did not succeed
            // (which dependency gets named depends on settle order)
            assert!(matches!(
                report.jobs["run-echo"].status,
                JobStatus::Skipped {
                    cause: SkipCause::DependencyFailed { .. }
                }
            ));
            // Both cleanups executed regardless
            assert_eq!(report.jobs["cleanup-server"].status, JobStatus::Passed);
            assert_eq!(report.jobs["cleanup-client"].status, JobStatus::Passed);
            let order = order_of(&log);
            assert!(order.contains(&"cleanup-server".to_string()));
            assert!(order.contains(&"cleanup-client".to_string()));
            assert!(!order.contains(&"run-echo".to_string()));
        }
    }

    #[tokio::test]
    async fn timed_out_job_fails_the_pipeline() {
        let specs = vec![
            ("run", TestOutcome::TimeOut(30), false, 0),
            ("cleanup", TestOutcome::Pass, true, 0),
        ];
        let (jobs, _log) = TestJob::registry(&specs);
        let graph = DependencyGraph::from(HashMap::from([
            ("run".to_string(), vec!["cleanup".to_string()]),
            ("cleanup".to_string(), vec![]),
        ]));
        let entrypoints = EntryPoints::from(vec!["run".to_string()]);

        let executor = WorkQueueExecutor::new(2);
        let report = executor.execute(jobs, graph, entrypoints).await.unwrap();

        assert!(!report.passed());
        assert_eq!(
            report.jobs["run"].status,
            JobStatus::TimedOut { timeout_seconds: 30 }
        );
        assert_eq!(report.jobs["cleanup"].status, JobStatus::Passed);
    }

    #[tokio::test]
    async fn concurrency_limit_of_one_still_completes() {
        let (jobs, log) = TestJob::registry(&nightly_specs(TestOutcome::Pass));
        let executor = WorkQueueExecutor::new(1);

        let report = executor
            .execute(jobs, nightly_graph(), entrypoints())
            .await
            .unwrap();

        assert!(report.passed());
        assert_eq!(order_of(&log).len(), 7);
    }
}
