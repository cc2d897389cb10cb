// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::ParamsConfig;
use crate::errors::FailureStrategy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration structure for a test pipeline.
///
/// This struct represents the complete description of one pipeline run: the
/// execution strategy, the build/run parameters, the remote nodes, the
/// dispatch targets, and the job graph. It is loaded from a YAML file.
///
/// # Fields
/// * `strategy` - The execution strategy to use for the pipeline
/// * `failure_strategy` - How to handle job failures (optional, defaults to FailFast)
/// * `executor_options` - Executor-specific configuration options (optional)
/// * `params` - Build/run parameters, each overridable via environment (optional)
/// * `nodes` - Named remote test machines (optional)
/// * `targets` - Named command templates, the Makefile-target equivalent (optional)
/// * `jobs` - Vector of job configurations that define the pipeline DAG
///
/// # Example
/// ```yaml
/// strategy: work_queue
/// failure_strategy: fail_fast
/// executor_options:
///   max_concurrency: 4
/// params:
///   libos: catnap
///   bufsize: 1024
/// nodes:
///   server: { host: "10.0.0.1", user: "ci" }
/// targets:
///   build: { command: "cargo build --release --features=${libos}" }
/// jobs:
///   - id: "build-server"
///     type: target
///     target: build
///     node: server
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub strategy: Strategy,
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default)]
    pub nodes: HashMap<String, NodeConfig>,
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
    pub jobs: Vec<JobConfig>,
}

/// Execution strategy for pipeline processing.
///
/// # Variants
/// * `WorkQueue` - Dependency-counting work queue with bounded concurrency
/// * `Serial` - Strictly sequential execution in topological order, the
///   shape of a CI workflow's gated job sequence
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    WorkQueue,
    Serial,
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of concurrent job executions
///   (optional, defaults to the CPU count; ignored by the serial executor)
#[derive(Debug, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: None,
        }
    }
}

/// A named remote test machine, reached over SSH.
///
/// # Example
/// ```yaml
/// nodes:
///   server:
///     host: "10.0.0.1"
///     user: ci
///     port: 2222
///     env:
///       peer: server
/// ```
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    /// Extra substitution variables available to jobs on this node
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// A named dispatch entry: a command template jobs can invoke by name.
///
/// Templates may reference `${libos}`, `${driver}`, `${bufsize}`,
/// `${injection_rate}`, `${timeout}` plus any node- or job-level variables.
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    pub command: String,
    pub description: Option<String>,
}

/// Configuration for a single job in the pipeline.
///
/// # Fields
/// * `id` - Unique identifier for this job
/// * `kind` - How the command is obtained (`shell` inline, `target` dispatch)
/// * `command` - Inline command template (for shell jobs)
/// * `target` - Dispatch-table entry name (for target jobs)
/// * `node` - Remote node to run on; local when omitted
/// * `depends_on` - Job IDs that must settle before this job starts
/// * `always_run` - Run even when dependencies failed (cleanup semantics)
/// * `timeout_seconds` - Per-job timeout override
/// * `workdir` - Working directory for local jobs
/// * `env` - Extra substitution variables, highest precedence; for local
///   jobs these are also exported into the process environment
///
/// # Example
/// ```yaml
/// id: "cleanup-server"
/// type: shell
/// command: "pkill -f udp-echo || true"
/// node: server
/// depends_on: [run-udp-echo]
/// always_run: true
/// ```
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: JobKind,
    pub command: Option<String>, // for shell
    pub target: Option<String>,  // for target dispatch
    pub node: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>, // defaults empty
    #[serde(default)]
    pub always_run: bool,
    pub timeout_seconds: Option<u64>,
    pub workdir: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// How a job's command line is obtained.
///
/// # Variants
/// * `Shell` - Inline command template in the job itself
/// * `Target` - Named entry in the dispatch table
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Shell,
    Target,
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
///
/// This function loads the configuration and validates the job graph to
/// ensure it's acyclic and all references (dependencies, nodes, targets)
/// are resolved.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = load_config(path)?;

    // Validate the job graph
    if let Err(validation_errors) = crate::config::validate_pipeline(&cfg) {
        // Convert validation errors into a single error message
        let error_messages: Vec<String> = validation_errors.iter().map(|e| e.to_string()).collect();
        let combined_error = format!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        );
        return Err(combined_error.into());
    }

    Ok(cfg)
}
