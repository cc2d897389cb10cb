use crate::config::JobConfig;

/// A type-safe wrapper for pipeline entry points - jobs with no dependencies.
///
/// Entry points are jobs that can be executed immediately when a pipeline
/// starts, as they don't depend on any other jobs. They serve as the
/// starting nodes for topological traversal of the job graph.
#[derive(Debug, Clone)]
pub struct EntryPoints(pub Vec<String>);

impl EntryPoints {
    /// Create a new empty entrypoints list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Collect the entry points from job configurations.
    pub fn from_jobs(jobs: &[JobConfig]) -> Self {
        Self(
            jobs.iter()
                .filter(|job| job.depends_on.is_empty())
                .map(|job| job.id.clone())
                .collect(),
        )
    }

    /// Add an entrypoint
    pub fn add(&mut self, job_id: String) {
        self.0.push(job_id);
    }

    /// Get iterator over entrypoints
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// True when there are no entry points (empty or fully cyclic pipeline)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for EntryPoints {
    fn from(entrypoints: Vec<String>) -> Self {
        Self(entrypoints)
    }
}

impl From<EntryPoints> for Vec<String> {
    fn from(value: EntryPoints) -> Self {
        value.0
    }
}
