// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Command template substitution for the dispatch table.
//!
//! Targets and shell jobs are written as templates: `${name}` placeholders
//! resolve against the build/run parameters, the node's `env`, and the job's
//! `env`, in that order of increasing precedence. Only `${...}` is special;
//! a bare `$VAR` passes through untouched so shell variables keep working,
//! and `$$` escapes a literal dollar sign.

use crate::config::{JobConfig, NodeConfig, Params};
use crate::jobs::DispatchError;
use std::collections::HashMap;

/// Build the substitution scope for one job.
///
/// Precedence (lowest to highest): resolved params, node env, job env.
pub fn substitution_vars(
    params: &Params,
    node: Option<&NodeConfig>,
    job: &JobConfig,
) -> HashMap<String, String> {
    let mut vars = params.substitutions();
    if let Some(node) = node {
        vars.extend(node.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    vars.extend(job.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars
}

/// Expand `${name}` placeholders in a command template.
///
/// Unknown placeholders are an error rather than an empty string: a missing
/// value in a command line is invisible until something downstream breaks.
pub fn expand(template: &str, vars: &HashMap<String, String>) -> Result<String, DispatchError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '$')) => {
                chars.next();
                out.push('$');
            }
            Some((start, '{')) => {
                let start = *start;
                chars.next();
                let mut end = None;
                for (i, c) in chars.by_ref() {
                    if c == '}' {
                        end = Some(i);
                        break;
                    }
                }
                let end = end.ok_or(DispatchError::UnterminatedPlaceholder)?;
                let name = &template[start + 1..end];
                let value = vars
                    .get(name)
                    .ok_or_else(|| DispatchError::UnresolvedPlaceholder(name.to_string()))?;
                out.push_str(value);
            }
            // Bare `$VAR` stays literal for the shell to interpret
            _ => out.push('$'),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LibOs, ParamsConfig};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expands_known_placeholders() {
        let result = expand(
            "cargo build --features=${libos} --bufsize ${bufsize}",
            &vars(&[("libos", "catnip"), ("bufsize", "2048")]),
        )
        .unwrap();
        assert_eq!(result, "cargo build --features=catnip --bufsize 2048");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let err = expand("run ${mystery}", &vars(&[])).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnresolvedPlaceholder("mystery".to_string())
        );
        assert!(err.to_string().contains("${mystery}"));
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let err = expand("run ${oops", &vars(&[("oops", "x")])).unwrap_err();
        assert_eq!(err, DispatchError::UnterminatedPlaceholder);
    }

    #[test]
    fn bare_dollar_passes_through() {
        let result = expand("echo $HOME and $1", &vars(&[])).unwrap();
        assert_eq!(result, "echo $HOME and $1");
    }

    #[test]
    fn double_dollar_escapes() {
        let result = expand("awk '{print $$2}'", &vars(&[])).unwrap();
        assert_eq!(result, "awk '{print $2}'");
    }

    #[test]
    fn job_env_overrides_node_env_overrides_params() {
        let params_cfg = ParamsConfig {
            libos: Some(LibOs::Catnap),
            ..ParamsConfig::default()
        };
        let params = Params::resolve_with(&params_cfg, |_| None).unwrap();

        let node: NodeConfig = serde_yaml::from_str(
            r#"
host: "10.0.0.1"
env:
  libos: catnip
  peer: server
"#,
        )
        .unwrap();

        let job: JobConfig = serde_yaml::from_str(
            r#"
id: run
type: shell
command: "ignored"
env:
  peer: client
"#,
        )
        .unwrap();

        let scope = substitution_vars(&params, Some(&node), &job);
        assert_eq!(scope.get("libos").unwrap(), "catnip"); // node wins over params
        assert_eq!(scope.get("peer").unwrap(), "client"); // job wins over node
        assert_eq!(scope.get("driver").unwrap(), "mlx5"); // params still present
    }
}
