// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Config, Strategy};
use crate::engine::serial::SerialExecutor;
use crate::engine::work_queue::WorkQueueExecutor;
use crate::traits::PipelineExecutor;

/// Factory for creating pipeline executors from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create a pipeline executor based on the configuration strategy
    pub fn from_config(cfg: &Config) -> Box<dyn PipelineExecutor> {
        let max_concurrency = cfg.executor_options.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });

        match cfg.strategy {
            Strategy::WorkQueue => Box::new(WorkQueueExecutor::new(max_concurrency)),
            Strategy::Serial => Box::new(SerialExecutor::new()),
        }
    }
}
