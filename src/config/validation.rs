//! Configuration validation for pipeline integrity and correctness.
//!
//! This module provides comprehensive validation for pipeline configurations,
//! ensuring that job dependency graphs are valid, acyclic, and executable,
//! and that every node and target reference resolves. The validation system
//! performs multiple checks in a specific order to provide meaningful error
//! messages and prevent invalid pipeline execution attempts.
//!
//! # Validation Pipeline
//!
//! The validation process follows a four-stage pipeline:
//!
//! 1. **Uniqueness Validation**: Ensures all job IDs are unique
//! 2. **Reference Validation**: Verifies all dependencies point to existing jobs
//! 3. **Declaration Validation**: Verifies node and target references resolve
//! 4. **Cycle Detection**: Uses DFS to detect circular dependencies
//!
//! This ordering is important because cycle detection requires a valid graph
//! structure, so reference validation must pass first.

use crate::config::Config;
use crate::errors::ValidationError;
use std::collections::{HashMap, HashSet};

/// Validates a pipeline configuration for structural integrity.
///
/// This is the main validation entry point that orchestrates all validation
/// checks in the correct order:
///
/// 1. **Job IDs are unique** - No duplicate job identifiers
/// 2. **Dependencies are resolvable** - All `depends_on` references point to existing jobs
/// 3. **Nodes and targets are declared** - Every `node`/`target` reference resolves
/// 4. **Graph is acyclic** - No circular dependencies that would prevent execution
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - Configuration is valid and ready for execution
/// * `Err(Vec<ValidationError>)` - List of all validation errors found
///
/// # Error Accumulation
///
/// This function accumulates multiple errors when possible, allowing users to
/// see all validation issues at once rather than fixing them one by one.
/// However, cycle detection is skipped if there are reference errors, since
/// cycle detection requires a valid graph.
pub fn validate_pipeline(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Check for duplicate job IDs
    if let Err(duplicate_errors) = validate_unique_job_ids(config) {
        errors.extend(duplicate_errors);
    }

    // Check for unresolved dependencies
    let references_ok = match validate_dependency_references(config) {
        Ok(()) => true,
        Err(unresolved_errors) => {
            errors.extend(unresolved_errors);
            false
        }
    };

    // Check node and target references
    if let Err(declaration_errors) = validate_declarations(config) {
        errors.extend(declaration_errors);
    }

    // Check for cycles (only on a structurally valid graph)
    if references_ok {
        if let Err(cycle_errors) = validate_acyclic_graph(config) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that all job IDs are unique within the configuration.
///
/// Job IDs serve as the primary key for dependency resolution, execution
/// tracking, and report storage, so duplicates would make the run ambiguous.
fn validate_unique_job_ids(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for job in &config.jobs {
        if !seen_ids.insert(&job.id) {
            errors.push(ValidationError::DuplicateJobId {
                job_id: job.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that all dependency references point to existing jobs.
fn validate_dependency_references(config: &Config) -> Result<(), Vec<ValidationError>> {
    let job_ids: HashSet<&String> = config.jobs.iter().map(|j| &j.id).collect();
    let mut errors = Vec::new();

    for job in &config.jobs {
        for dependency in &job.depends_on {
            if !job_ids.contains(dependency) {
                errors.push(ValidationError::UnresolvedDependency {
                    job_id: job.id.clone(),
                    missing_dependency: dependency.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that every `node` and `target` reference is declared.
///
/// The job factory would catch these too, but catching them here lets one
/// validation pass surface every dangling reference alongside the graph
/// problems instead of failing on the first job built.
fn validate_declarations(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for job in &config.jobs {
        if let Some(node) = &job.node {
            if !config.nodes.contains_key(node) {
                errors.push(ValidationError::UnknownNode {
                    job_id: job.id.clone(),
                    node: node.clone(),
                });
            }
        }
        if let Some(target) = &job.target {
            if !config.targets.contains_key(target) {
                errors.push(ValidationError::UnknownTarget {
                    job_id: job.id.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that the dependency graph is acyclic using DFS-based cycle
/// detection with a recursion stack, reporting the actual cycle path.
fn validate_acyclic_graph(config: &Config) -> Result<(), Vec<ValidationError>> {
    // id -> its dependencies, the direction DFS walks
    let dependencies: HashMap<&String, &Vec<String>> = config
        .jobs
        .iter()
        .map(|job| (&job.id, &job.depends_on))
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: HashMap<&String, Mark> = dependencies
        .keys()
        .map(|id| (*id, Mark::Unvisited))
        .collect();
    let mut errors = Vec::new();

    // Deterministic traversal order keeps the reported cycle stable
    let mut roots: Vec<&String> = dependencies.keys().copied().collect();
    roots.sort();

    fn visit<'a>(
        job_id: &'a String,
        dependencies: &HashMap<&'a String, &'a Vec<String>>,
        marks: &mut HashMap<&'a String, Mark>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        match marks.get(job_id).copied() {
            Some(Mark::Done) => return None,
            Some(Mark::InProgress) => {
                // Found a back edge: the cycle is the path suffix from the
                // first occurrence of this job, closed with the job itself
                let start = path.iter().position(|p| p == job_id).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(job_id.clone());
                return Some(cycle);
            }
            _ => {}
        }

        marks.insert(job_id, Mark::InProgress);
        path.push(job_id.clone());

        if let Some(deps) = dependencies.get(job_id) {
            for dependency in deps.iter() {
                if let Some((dep_key, _)) = dependencies.get_key_value(&dependency) {
                    if let Some(cycle) = visit(dep_key, dependencies, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        marks.insert(job_id, Mark::Done);
        None
    }

    for root in roots {
        if marks[root] == Mark::Unvisited {
            let mut path = Vec::new();
            if let Some(cycle) = visit(root, &dependencies, &mut marks, &mut path) {
                errors.push(ValidationError::CyclicDependency { cycle });
                break; // one cycle is enough to make the point
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JobConfig, JobKind, Strategy};

    fn job(id: &str, depends_on: &[&str]) -> JobConfig {
        JobConfig {
            id: id.to_string(),
            kind: JobKind::Shell,
            command: Some("true".to_string()),
            target: None,
            node: None,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            always_run: false,
            timeout_seconds: None,
            workdir: None,
            env: Default::default(),
        }
    }

    fn config(jobs: Vec<JobConfig>) -> Config {
        Config {
            strategy: Strategy::WorkQueue,
            failure_strategy: Default::default(),
            executor_options: Default::default(),
            params: Default::default(),
            nodes: Default::default(),
            targets: Default::default(),
            jobs,
        }
    }

    #[test]
    fn valid_pipeline_passes() {
        let cfg = config(vec![
            job("setup", &[]),
            job("build", &["setup"]),
            job("cleanup", &["build"]),
        ]);
        assert!(validate_pipeline(&cfg).is_ok());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let cfg = config(vec![job("build", &[]), job("build", &[])]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateJobId {
            job_id: "build".to_string()
        }));
    }

    #[test]
    fn unresolved_dependency_is_reported() {
        let cfg = config(vec![job("build", &["missing"])]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedDependency {
                job_id: "build".to_string(),
                missing_dependency: "missing".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_node_and_target_are_reported() {
        let mut bad_node = job("remote", &[]);
        bad_node.node = Some("ghost".to_string());
        let mut bad_target = job("dispatch", &[]);
        bad_target.kind = JobKind::Target;
        bad_target.command = None;
        bad_target.target = Some("nothing".to_string());

        let errors = validate_pipeline(&config(vec![bad_node, bad_target])).unwrap_err();
        assert!(errors.contains(&ValidationError::UnknownNode {
            job_id: "remote".to_string(),
            node: "ghost".to_string(),
        }));
        assert!(errors.contains(&ValidationError::UnknownTarget {
            job_id: "dispatch".to_string(),
            target: "nothing".to_string(),
        }));
    }

    #[test]
    fn two_job_cycle_is_detected_with_path() {
        let cfg = config(vec![job("a", &["b"]), job("b", &["a"])]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        match &errors[0] {
            ValidationError::CyclicDependency { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.len() >= 3);
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let cfg = config(vec![job("a", &["a"])]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::CyclicDependency { .. }
        ));
    }

    #[test]
    fn cycle_detection_skipped_when_references_are_broken() {
        // a -> missing is an unresolved reference; the cycle check must not run
        let cfg = config(vec![job("a", &["missing"])]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::UnresolvedDependency { .. }
        ));
    }
}
