//! Shared subprocess runner: spawn, wait with timeout, capture output.

use crate::report::JobStatus;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// How many bytes of stdout/stderr to keep in the report.
const OUTPUT_TAIL_BYTES: usize = 4096;

/// Outcome of one subprocess invocation.
pub(crate) struct RunOutcome {
    pub status: JobStatus,
    pub duration: Duration,
    pub stdout_tail: String,
    pub stderr_tail: String,
}

/// Run `program args...` to completion under a timeout.
///
/// Every failure mode is folded into the returned [`JobStatus`]: a spawn
/// error reports as `Failed` with no exit code, and a timeout kills the
/// child (`kill_on_drop`) and reports `TimedOut`. Stdin is closed so an
/// interactive command fails fast instead of hanging until the timeout.
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    env: &HashMap<String, String>,
    workdir: Option<&PathBuf>,
    timeout: Duration,
) -> RunOutcome {
    let start = Instant::now();

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in env {
        command.env(key, value);
    }
    if let Some(dir) = workdir {
        command.current_dir(dir);
    }

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return RunOutcome {
                status: JobStatus::Failed { exit_code: None },
                duration: start.elapsed(),
                stdout_tail: String::new(),
                stderr_tail: format!("failed to spawn '{}': {}", program, e),
            }
        }
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let status = match output.status.code() {
                Some(0) => JobStatus::Passed,
                code => JobStatus::Failed { exit_code: code },
            };
            RunOutcome {
                status,
                duration: start.elapsed(),
                stdout_tail: tail(&output.stdout),
                stderr_tail: tail(&output.stderr),
            }
        }
        Ok(Err(e)) => RunOutcome {
            status: JobStatus::Failed { exit_code: None },
            duration: start.elapsed(),
            stdout_tail: String::new(),
            stderr_tail: format!("failed waiting for '{}': {}", program, e),
        },
        // Dropping the wait future drops the child handle, which kills the
        // process (kill_on_drop). Captured output is lost with it.
        Err(_) => RunOutcome {
            status: JobStatus::TimedOut {
                timeout_seconds: timeout.as_secs(),
            },
            duration: start.elapsed(),
            stdout_tail: String::new(),
            stderr_tail: String::new(),
        },
    }
}

/// Keep the last `OUTPUT_TAIL_BYTES` of a stream as lossy UTF-8.
fn tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(OUTPUT_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_the_end_of_long_output() {
        let data: Vec<u8> = std::iter::repeat(b'a')
            .take(OUTPUT_TAIL_BYTES)
            .chain(*b"the end")
            .collect();
        let t = tail(&data);
        assert_eq!(t.len(), OUTPUT_TAIL_BYTES);
        assert!(t.ends_with("the end"));
    }

    #[test]
    fn tail_keeps_short_output_whole() {
        assert_eq!(tail(b"hello"), "hello");
    }
}
