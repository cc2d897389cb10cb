// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::errors::JobMapError;
use crate::jobs::JobFactory;
use crate::traits::Job;
use std::collections::HashMap;
use std::sync::Arc;

/// Newtype wrapper for the job registry providing type safety
#[derive(Clone)]
pub struct JobMap(pub HashMap<String, Arc<dyn Job>>);

impl JobMap {
    /// Create a new empty job map
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build the registry from configuration.
    ///
    /// Resolves the build/run parameters against the environment, expands
    /// every job's command template, and instantiates the appropriate
    /// backend (local shell or remote SSH) per job.
    pub fn from_config(cfg: &Config) -> Result<Self, JobMapError> {
        let params = crate::config::Params::resolve(&cfg.params)
            .map_err(|e| JobMapError::InvalidParams {
                reason: e.to_string(),
            })?;
        let mut map = HashMap::new();
        for job_cfg in &cfg.jobs {
            let job = JobFactory::create_job(cfg, &params, job_cfg)?;
            map.insert(job_cfg.id.clone(), job);
        }
        Ok(Self(map))
    }

    /// Insert a job into the map
    pub fn insert(&mut self, id: String, job: Arc<dyn Job>) {
        self.0.insert(id, job);
    }

    /// Get a job by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Job>> {
        self.0.get(id)
    }

    /// Check if a job exists
    pub fn contains_key(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Get all job IDs
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of registered jobs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no jobs are registered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for JobMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobMap")
            .field("job_count", &self.0.len())
            .field("job_ids", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<HashMap<String, Arc<dyn Job>>> for JobMap {
    fn from(map: HashMap<String, Arc<dyn Job>>) -> Self {
        Self(map)
    }
}

impl From<JobMap> for HashMap<String, Arc<dyn Job>> {
    fn from(map: JobMap) -> Self {
        map.0
    }
}
