// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config + pipeline registry
pub mod engine;     // DAG executors
pub mod errors;     // error handling
pub mod jobs;       // job backends
pub mod observability;
pub mod report;     // per-job and pipeline status reports
pub mod traits;     // unified abstractions
