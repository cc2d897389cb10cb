// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod entry_points;
mod job_map;
mod loader;
mod params;
mod runtime;
mod validation;

pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use entry_points::EntryPoints;
pub use job_map::JobMap;
pub use loader::{
    load_and_validate_config, load_config, Config, ExecutorOptions, JobConfig, JobKind,
    NodeConfig, Strategy, TargetConfig,
};
pub use params::{LibOs, Params, ParamsConfig};
pub use runtime::RuntimeBuilder;
pub use validation::validate_pipeline;
