// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote job backend: runs the resolved command on a named node over SSH.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::NodeConfig;
use crate::jobs::runner;
use crate::report::{JobReport, JobStatus};
use crate::traits::Job;

/// ssh reserves exit code 255 for its own failures (unreachable host, auth
/// rejection); anything else is the remote command's exit code.
const SSH_TRANSPORT_FAILURE: i32 = 255;

/// A job that runs its resolved command on a remote node.
///
/// The invocation is non-interactive (`BatchMode=yes`): CI nodes are
/// expected to have key authentication set up, and a password prompt would
/// otherwise stall the pipeline until the timeout. The timeout covers the
/// whole SSH invocation, connection included.
pub struct RemoteJob {
    id: String,
    node: String,
    command: String,
    destination: String,
    port: Option<u16>,
    timeout: Duration,
    always_run: bool,
}

impl RemoteJob {
    /// Seconds ssh waits for the TCP connection before giving up on its own.
    const CONNECT_TIMEOUT_SECONDS: u64 = 10;

    pub fn new(
        id: String,
        node_name: String,
        node: &NodeConfig,
        command: String,
        timeout: Duration,
        always_run: bool,
    ) -> Self {
        let destination = match &node.user {
            Some(user) => format!("{}@{}", user, node.host),
            None => node.host.clone(),
        };
        Self {
            id,
            node: node_name,
            command,
            destination,
            port: node.port,
            timeout,
            always_run,
        }
    }

    /// The full ssh argument vector, with the remote command as the final
    /// argument so the remote shell - not a local one - interprets it.
    fn ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", Self::CONNECT_TIMEOUT_SECONDS),
        ];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(self.destination.clone());
        args.push("--".to_string());
        args.push(self.command.clone());
        args
    }
}

#[async_trait]
impl Job for RemoteJob {
    async fn run(&self) -> JobReport {
        let outcome =
            runner::run_command("ssh", &self.ssh_args(), &HashMap::new(), None, self.timeout)
                .await;

        let mut stderr_tail = outcome.stderr_tail;
        if let JobStatus::Failed {
            exit_code: Some(SSH_TRANSPORT_FAILURE),
        } = outcome.status
        {
            if stderr_tail.is_empty() {
                stderr_tail = format!("ssh to '{}' failed (exit 255)", self.destination);
            }
        }

        JobReport {
            job_id: self.id.clone(),
            status: outcome.status,
            duration_ms: outcome.duration.as_millis() as u64,
            command: self.command.clone(),
            node: Some(self.node.clone()),
            stdout_tail: outcome.stdout_tail,
            stderr_tail,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn node(&self) -> Option<&str> {
        Some(&self.node)
    }

    fn always_run(&self) -> bool {
        self.always_run
    }
}
