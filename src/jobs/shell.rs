// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local shell job backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::jobs::runner;
use crate::report::JobReport;
use crate::traits::Job;

/// A job that runs its resolved command on the local machine via `sh -c`.
///
/// The job's `env` entries are exported into the child's environment in
/// addition to having been available as substitution variables, so commands
/// can read them either way.
pub struct ShellJob {
    id: String,
    command: String,
    env: HashMap<String, String>,
    workdir: Option<PathBuf>,
    timeout: Duration,
    always_run: bool,
}

impl ShellJob {
    pub fn new(
        id: String,
        command: String,
        env: HashMap<String, String>,
        workdir: Option<PathBuf>,
        timeout: Duration,
        always_run: bool,
    ) -> Self {
        Self {
            id,
            command,
            env,
            workdir,
            timeout,
            always_run,
        }
    }
}

#[async_trait]
impl Job for ShellJob {
    async fn run(&self) -> JobReport {
        let outcome = runner::run_command(
            "sh",
            &["-c".to_string(), self.command.clone()],
            &self.env,
            self.workdir.as_ref(),
            self.timeout,
        )
        .await;

        JobReport {
            job_id: self.id.clone(),
            status: outcome.status,
            duration_ms: outcome.duration.as_millis() as u64,
            command: self.command.clone(),
            node: None,
            stdout_tail: outcome.stdout_tail,
            stderr_tail: outcome.stderr_tail,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn always_run(&self) -> bool {
        self.always_run
    }
}
