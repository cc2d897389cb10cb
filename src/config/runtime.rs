// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Config, JobMap};
use crate::engine::ExecutorFactory;
use crate::errors::FailureStrategy;
use crate::traits::PipelineExecutor;

/// Pipeline runtime builder - orchestrates job map and executor creation
/// from configuration.
///
/// The `RuntimeBuilder` provides a clean interface for creating complete
/// pipeline runtime environments from configuration. It coordinates the
/// creation of both the job registry and the execution engine, ensuring
/// they're properly configured and compatible.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build complete pipeline runtime from configuration.
    ///
    /// Creates and returns:
    /// - `JobMap`: Registry of all configured jobs, commands fully resolved
    /// - `Box<dyn PipelineExecutor>`: Executor configured per strategy
    /// - `FailureStrategy`: How to handle job failures
    ///
    /// # Arguments
    /// * `cfg` - Configuration containing job definitions, execution strategy, and options
    ///
    /// # Returns
    /// A tuple of (JobMap, PipelineExecutor, FailureStrategy) ready for execution
    pub fn from_config(
        cfg: &Config,
    ) -> Result<(JobMap, Box<dyn PipelineExecutor>, FailureStrategy), String> {
        let jobs = JobMap::from_config(cfg).map_err(|e| e.to_string())?;
        let executor = ExecutorFactory::from_config(cfg);
        Ok((jobs, executor, cfg.failure_strategy))
    }
}
