// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur during pipeline configuration validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected in the job graph
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A job references a dependency that doesn't exist
    UnresolvedDependency {
        /// The job that has the unresolved dependency
        job_id: String,
        /// The dependency that couldn't be resolved
        missing_dependency: String,
    },
    /// A job has a duplicate ID
    DuplicateJobId {
        /// The duplicate job ID
        job_id: String,
    },
    /// A job references a node that isn't declared in the `nodes` section
    UnknownNode {
        /// The job with the dangling node reference
        job_id: String,
        /// The node name that couldn't be resolved
        node: String,
    },
    /// A job references a target that isn't declared in the `targets` section
    UnknownTarget {
        /// The job with the dangling target reference
        job_id: String,
        /// The target name that couldn't be resolved
        target: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                job_id,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Job '{}' depends on '{}' which does not exist",
                    job_id, missing_dependency
                )
            }
            ValidationError::DuplicateJobId { job_id } => {
                write!(f, "Duplicate job ID: '{}'", job_id)
            }
            ValidationError::UnknownNode { job_id, node } => {
                write!(
                    f,
                    "Job '{}' targets node '{}' which is not declared",
                    job_id, node
                )
            }
            ValidationError::UnknownTarget { job_id, target } => {
                write!(
                    f,
                    "Job '{}' dispatches target '{}' which is not declared",
                    job_id, target
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
