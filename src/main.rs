// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use testrig::config::{
    load_and_validate_config, Config, DependencyGraph, EntryPoints, Params, RuntimeBuilder,
};
use testrig::observability::messages::validation::{ConfigLoaded, ConfigRejected};
use testrig::observability::messages::StructuredLog;
use testrig::report::{JobStatus, PipelineReport};
use testrig::traits::PipelineExecutor as _;

#[derive(Parser)]
#[command(
    name = "testrig",
    about = "DAG-driven test pipeline runner for networking demo suites"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more pipeline configurations in order
    Run {
        /// Pipeline configuration files (YAML)
        #[arg(required = true)]
        configs: Vec<PathBuf>,
        /// Resolve and print every job's command without executing anything
        #[arg(long)]
        dry_run: bool,
        /// Write a JSON report of all runs to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate pipeline configurations without running them
    Validate {
        /// Pipeline configuration files (YAML)
        #[arg(required = true)]
        configs: Vec<PathBuf>,
    },
    /// List the dispatch targets of a configuration with resolved parameters
    Targets {
        /// Pipeline configuration file (YAML)
        config: PathBuf,
    },
}

/// One entry of the JSON report artifact.
#[derive(Serialize)]
struct RunSummary {
    config: String,
    passed: bool,
    elapsed_ms: u64,
    jobs: Vec<testrig::report::JobReport>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            2
        }
    };
    std::process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            configs,
            dry_run,
            report,
        } => run_pipelines(&configs, dry_run, report.as_deref()).await,
        Commands::Validate { configs } => validate_configs(&configs),
        Commands::Targets { config } => list_targets(&config),
    }
}

fn load(path: &Path) -> Result<Config> {
    match load_and_validate_config(path) {
        Ok(cfg) => {
            ConfigLoaded {
                path: &path.display().to_string(),
                job_count: cfg.jobs.len(),
                node_count: cfg.nodes.len(),
            }
            .log();
            Ok(cfg)
        }
        Err(e) => {
            ConfigRejected {
                path: &path.display().to_string(),
                reason: &e.to_string(),
            }
            .log();
            Err(anyhow!("{}: {}", path.display(), e))
        }
    }
}

async fn run_pipelines(
    configs: &[PathBuf],
    dry_run: bool,
    report_path: Option<&Path>,
) -> Result<i32> {
    // Ctrl-C stops scheduling; in-flight jobs finish and cleanup still runs
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut summaries = Vec::new();
    let mut all_passed = true;

    for path in configs {
        let cfg = load(path)?;
        let (jobs, executor, failure_strategy) =
            RuntimeBuilder::from_config(&cfg).map_err(|e| anyhow!(e))?;
        let graph = DependencyGraph::from_jobs(&cfg.jobs);
        let entrypoints = EntryPoints::from_jobs(&cfg.jobs);

        println!("📋 Pipeline: {}", path.display());
        println!(
            "🔧 Strategy: {:?} | Failure strategy: {:?} | {} jobs",
            cfg.strategy,
            failure_strategy,
            cfg.jobs.len()
        );

        if dry_run {
            let mut ids: Vec<&String> = jobs.keys().collect();
            ids.sort();
            for id in ids {
                let job = jobs.get(id).expect("listed id is present");
                let location = job.node().unwrap_or("local");
                let cleanup = if job.always_run() { " [always-run]" } else { "" };
                println!("  {} ({}){} $ {}", id, location, cleanup, job.command());
            }
            println!();
            continue;
        }

        let report = executor
            .execute_with_strategy(jobs, graph, entrypoints, failure_strategy, cancel.clone())
            .await
            .with_context(|| format!("pipeline '{}' could not run", path.display()))?;

        render(&report);
        all_passed &= report.passed();
        summaries.push(RunSummary {
            config: path.display().to_string(),
            passed: report.passed(),
            elapsed_ms: report.elapsed_ms,
            jobs: report.sorted().into_iter().cloned().collect(),
        });
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&summaries)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to '{}'", path.display()))?;
        println!("📝 Report written to {}", path.display());
    }

    Ok(if all_passed { 0 } else { 1 })
}

fn render(report: &PipelineReport) {
    println!("\n📊 Results:");
    for job in report.sorted() {
        let glyph = match job.status {
            JobStatus::Passed => "✅",
            JobStatus::Failed { .. } => "❌",
            JobStatus::TimedOut { .. } => "⏰",
            JobStatus::Skipped { .. } => "⏭️",
        };
        let location = job.node.as_deref().unwrap_or("local");
        println!(
            "  {} {} ({}, {} ms) - {}",
            glyph, job.job_id, location, job.duration_ms, job.status
        );
        if job.status.is_failure() && !job.stderr_tail.is_empty() {
            for line in job.stderr_tail.lines().rev().take(5).collect::<Vec<_>>().into_iter().rev() {
                println!("      {}", line);
            }
        }
    }

    let (passed, failed, skipped) = report.counts();
    let verdict = if report.passed() { "🎉 PASSED" } else { "💥 FAILED" };
    println!(
        "\n{} - {} passed, {} failed, {} skipped in {} ms\n",
        verdict, passed, failed, skipped, report.elapsed_ms
    );
}

fn validate_configs(configs: &[PathBuf]) -> Result<i32> {
    let mut ok = true;
    for path in configs {
        match load(path) {
            Ok(cfg) => {
                println!(
                    "✅ {}: {} jobs, {} nodes, {} targets",
                    path.display(),
                    cfg.jobs.len(),
                    cfg.nodes.len(),
                    cfg.targets.len()
                );
            }
            Err(e) => {
                eprintln!("❌ {:#}", e);
                ok = false;
            }
        }
    }
    Ok(if ok { 0 } else { 2 })
}

fn list_targets(path: &Path) -> Result<i32> {
    let cfg = load(path)?;
    let params = Params::resolve(&cfg.params).map_err(|e| anyhow!(e))?;

    println!("⚙️  Parameters:");
    println!("  libos          = {}", params.libos);
    println!("  driver         = {}", params.driver);
    println!("  bufsize        = {}", params.bufsize);
    println!("  injection_rate = {}", params.injection_rate);
    println!("  timeout        = {}s", params.timeout_seconds);

    println!("\n🎯 Targets:");
    let mut names: Vec<&String> = cfg.targets.keys().collect();
    names.sort();
    for name in names {
        let target = &cfg.targets[name];
        match &target.description {
            Some(description) => println!("  {} - {}", name, description),
            None => println!("  {}", name),
        }
        println!("      $ {}", target.command);
    }

    Ok(0)
}
