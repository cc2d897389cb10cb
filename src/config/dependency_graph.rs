use crate::config::JobConfig;
use std::collections::HashMap;

/// Newtype wrapper for the job dependency graph providing type safety.
///
/// The adjacency list maps a job ID to the IDs of the jobs that depend on it
/// (its dependents), so an edge points in the direction execution flows.
#[derive(Debug, Clone)]
pub struct DependencyGraph(pub HashMap<String, Vec<String>>);

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build the graph from job configurations.
    ///
    /// Every job appears as a key, including jobs with no dependents.
    pub fn from_jobs(jobs: &[JobConfig]) -> Self {
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();
        for job in jobs {
            graph.entry(job.id.clone()).or_default();
            for dependency in &job.depends_on {
                graph
                    .entry(dependency.clone())
                    .or_default()
                    .push(job.id.clone());
            }
        }
        Self(graph)
    }

    /// Get dependents for a job
    pub fn get_dependents(&self, job_id: &str) -> Option<&Vec<String>> {
        self.0.get(job_id)
    }

    /// Get all job IDs in the graph
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of jobs in the graph
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the graph has no jobs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build the reverse map: job ID -> the IDs it depends on.
    pub fn build_reverse_dependencies(&self) -> HashMap<String, Vec<String>> {
        let mut reverse: HashMap<String, Vec<String>> = HashMap::new();
        for job_id in self.0.keys() {
            reverse.entry(job_id.clone()).or_default();
        }
        for (dependency, dependents) in &self.0 {
            for dependent in dependents {
                reverse
                    .entry(dependent.clone())
                    .or_default()
                    .push(dependency.clone());
            }
        }
        // Deterministic ordering so skip reports name the same dependency every run
        for deps in reverse.values_mut() {
            deps.sort();
        }
        reverse
    }

    /// Count how many dependencies each job is waiting for.
    pub fn build_dependency_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = self.0.keys().map(|id| (id.clone(), 0)).collect();
        for dependents in self.0.values() {
            for dependent in dependents {
                *counts.entry(dependent.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Compute dependency counts and topological ranks together.
    ///
    /// The rank of a job is the length of the longest dependency chain above
    /// it (entry points are rank 0), which guarantees every job outranks all
    /// of its dependencies. Returns `None` if the graph contains a cycle.
    pub fn dependency_counts_and_ranks(
        &self,
    ) -> Option<(HashMap<String, usize>, HashMap<String, usize>)> {
        let counts = self.build_dependency_counts();

        let mut remaining = counts.clone();
        let mut ranks: HashMap<String, usize> =
            counts.keys().map(|id| (id.clone(), 0)).collect();
        let mut frontier: Vec<String> = remaining
            .iter()
            .filter_map(|(id, &count)| if count == 0 { Some(id.clone()) } else { None })
            .collect();
        let mut processed = 0;

        // Kahn's algorithm, propagating longest-path depth as the rank
        while let Some(job_id) = frontier.pop() {
            processed += 1;
            let rank = ranks[&job_id];
            if let Some(dependents) = self.0.get(&job_id) {
                for dependent in dependents {
                    let dependent_rank = ranks.get_mut(dependent)?;
                    *dependent_rank = (*dependent_rank).max(rank + 1);
                    let count = remaining.get_mut(dependent)?;
                    *count -= 1;
                    if *count == 0 {
                        frontier.push(dependent.clone());
                    }
                }
            }
        }

        if processed == counts.len() {
            Some((counts, ranks))
        } else {
            None // cycle
        }
    }
}

impl From<HashMap<String, Vec<String>>> for DependencyGraph {
    fn from(graph: HashMap<String, Vec<String>>) -> Self {
        Self(graph)
    }
}

impl From<DependencyGraph> for HashMap<String, Vec<String>> {
    fn from(graph: DependencyGraph) -> Self {
        graph.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> DependencyGraph {
        DependencyGraph::from(HashMap::from([
            ("a".to_string(), vec!["b".to_string(), "c".to_string()]),
            ("b".to_string(), vec!["d".to_string()]),
            ("c".to_string(), vec!["d".to_string()]),
            ("d".to_string(), vec![]),
        ]))
    }

    #[test]
    fn dependency_counts_for_diamond() {
        let counts = diamond().build_dependency_counts();
        assert_eq!(counts.get("a"), Some(&0));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.get("c"), Some(&1));
        assert_eq!(counts.get("d"), Some(&2));
    }

    #[test]
    fn ranks_follow_longest_path() {
        let (_, ranks) = diamond().dependency_counts_and_ranks().unwrap();
        assert_eq!(ranks.get("a"), Some(&0));
        assert_eq!(ranks.get("b"), Some(&1));
        assert_eq!(ranks.get("c"), Some(&1));
        assert_eq!(ranks.get("d"), Some(&2));
    }

    #[test]
    fn cycle_yields_none() {
        let graph = DependencyGraph::from(HashMap::from([
            ("a".to_string(), vec!["b".to_string()]),
            ("b".to_string(), vec!["a".to_string()]),
        ]));
        assert!(graph.dependency_counts_and_ranks().is_none());
    }

    #[test]
    fn reverse_dependencies_are_sorted() {
        let reverse = diamond().build_reverse_dependencies();
        assert_eq!(reverse.get("d").unwrap(), &vec!["b".to_string(), "c".to_string()]);
        assert!(reverse.get("a").unwrap().is_empty());
    }
}
