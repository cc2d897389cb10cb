// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for job map creation and job instantiation.

use std::error::Error;
use std::fmt;

/// Errors that can occur while building the job registry from configuration
#[derive(Debug)]
pub enum JobMapError {
    /// A `shell` job is missing its `command` field
    MissingCommand { job_id: String },

    /// A `target` job is missing its `target` field
    MissingTarget { job_id: String },

    /// A `target` job names a dispatch entry that doesn't exist
    UnknownTarget { job_id: String, target: String },

    /// A job names a node that doesn't exist
    UnknownNode { job_id: String, node: String },

    /// Command template substitution failed
    SubstitutionFailed { job_id: String, reason: String },

    /// Build/run parameters could not be resolved from the environment
    InvalidParams { reason: String },
}

impl fmt::Display for JobMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobMapError::MissingCommand { job_id } => {
                write!(f, "Shell job '{}' is missing the 'command' field", job_id)
            }
            JobMapError::MissingTarget { job_id } => {
                write!(f, "Target job '{}' is missing the 'target' field", job_id)
            }
            JobMapError::UnknownTarget { job_id, target } => {
                write!(
                    f,
                    "Job '{}' dispatches unknown target '{}'",
                    job_id, target
                )
            }
            JobMapError::UnknownNode { job_id, node } => {
                write!(f, "Job '{}' targets unknown node '{}'", job_id, node)
            }
            JobMapError::SubstitutionFailed { job_id, reason } => {
                write!(
                    f,
                    "Failed to resolve command for job '{}': {}",
                    job_id, reason
                )
            }
            JobMapError::InvalidParams { reason } => {
                write!(f, "Failed to resolve build parameters: {}", reason)
            }
        }
    }
}

impl Error for JobMapError {}
