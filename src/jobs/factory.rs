use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, JobConfig, JobKind, Params};
use crate::errors::JobMapError;
use crate::jobs::{dispatch, RemoteJob, ShellJob};
use crate::traits::Job;

/// Factory for creating job instances from configuration.
pub struct JobFactory;

impl JobFactory {
    /// Create a job instance from configuration.
    ///
    /// Resolution order:
    /// 1. Obtain the command template (`command` for shell jobs, dispatch
    ///    table lookup for target jobs)
    /// 2. Expand `${...}` placeholders against params + node env + job env
    /// 3. Wrap in a [`RemoteJob`] when `node` is set, [`ShellJob`] otherwise
    pub fn create_job(
        cfg: &Config,
        params: &Params,
        job_cfg: &JobConfig,
    ) -> Result<Arc<dyn Job>, JobMapError> {
        let node = match &job_cfg.node {
            Some(name) => Some((
                name.clone(),
                cfg.nodes.get(name).ok_or_else(|| JobMapError::UnknownNode {
                    job_id: job_cfg.id.clone(),
                    node: name.clone(),
                })?,
            )),
            None => None,
        };

        let template = match job_cfg.kind {
            JobKind::Shell => {
                job_cfg
                    .command
                    .clone()
                    .ok_or_else(|| JobMapError::MissingCommand {
                        job_id: job_cfg.id.clone(),
                    })?
            }
            JobKind::Target => {
                let target_name =
                    job_cfg
                        .target
                        .as_ref()
                        .ok_or_else(|| JobMapError::MissingTarget {
                            job_id: job_cfg.id.clone(),
                        })?;
                cfg.targets
                    .get(target_name)
                    .ok_or_else(|| JobMapError::UnknownTarget {
                        job_id: job_cfg.id.clone(),
                        target: target_name.clone(),
                    })?
                    .command
                    .clone()
            }
        };

        let vars = dispatch::substitution_vars(params, node.as_ref().map(|(_, n)| *n), job_cfg);
        let command =
            dispatch::expand(&template, &vars).map_err(|e| JobMapError::SubstitutionFailed {
                job_id: job_cfg.id.clone(),
                reason: e.to_string(),
            })?;

        let timeout =
            Duration::from_secs(job_cfg.timeout_seconds.unwrap_or(params.timeout_seconds));

        match node {
            Some((node_name, node_cfg)) => Ok(Arc::new(RemoteJob::new(
                job_cfg.id.clone(),
                node_name,
                node_cfg,
                command,
                timeout,
                job_cfg.always_run,
            ))),
            None => Ok(Arc::new(ShellJob::new(
                job_cfg.id.clone(),
                command,
                job_cfg.env.clone(),
                job_cfg.workdir.as_ref().map(PathBuf::from),
                timeout,
                job_cfg.always_run,
            ))),
        }
    }
}
