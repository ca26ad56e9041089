//! Launching and awaiting the external test script.
//!
//! The script receives exactly four positional arguments: pull repo URL,
//! reference repo URL, commit sha, workspace root. It clones the pull,
//! checks out the sha, runs the comparison against the reference and writes
//! its artifacts under `tests/<sha>/`. The bot only observes its exit event
//! and the failure marker on disk: stdout/stderr are inherited, never
//! captured, and the exit status is recorded but never interpreted.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use review_host::CommitSha;

/// Launch failures. A runner that starts but exits badly is NOT an error:
/// pass/fail is decided by the failure marker, never the exit status.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The script could not be spawned at all
    #[error("Failed to spawn test script {script}: {source}")]
    Spawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the spawned script failed
    #[error("Failed waiting for test script: {0}")]
    Wait(std::io::Error),
}

/// Outcome of one awaited runner process.
#[derive(Debug)]
pub struct RunCompletion {
    pub sha: CommitSha,
    /// Wall time from spawn to exit (or kill).
    pub elapsed: Duration,
    /// Exit status; absent when the run was killed on timeout.
    pub status: Option<ExitStatus>,
    pub timed_out: bool,
}

impl RunCompletion {
    /// Wall time in minutes, the unit the result comment reports.
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}

/// External test script launcher.
#[derive(Debug, Clone)]
pub struct TestRunner {
    script: PathBuf,
    timeout: Option<Duration>,
}

impl TestRunner {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        TestRunner {
            script: script.into(),
            timeout: None,
        }
    }

    /// Opt-in watchdog. Off by default: the historical contract is to wait
    /// for the script however long it takes.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawn the script for one commit and wait for it to exit.
    pub async fn run(
        &self,
        pull_repo_url: &str,
        ref_repo_url: &str,
        sha: &CommitSha,
        workspace_root: &Path,
    ) -> Result<RunCompletion, RunnerError> {
        let start = Instant::now();
        debug!(script = %self.script.display(), sha = sha.short(), "spawning test script");

        let mut child = Command::new(&self.script)
            .arg(pull_repo_url)
            .arg(ref_repo_url)
            .arg(sha.as_str())
            .arg(workspace_root)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                script: self.script.display().to_string(),
                source,
            })?;

        let (status, timed_out) = match self.timeout {
            None => (Some(child.wait().await.map_err(RunnerError::Wait)?), false),
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => (Some(status.map_err(RunnerError::Wait)?), false),
                Err(_) => {
                    warn!(
                        sha = sha.short(),
                        timeout_secs = limit.as_secs(),
                        "test script timed out, killing"
                    );
                    child.kill().await.map_err(RunnerError::Wait)?;
                    (None, true)
                }
            },
        };

        let completion = RunCompletion {
            sha: sha.clone(),
            elapsed: start.elapsed(),
            status,
            timed_out,
        };
        debug!(
            sha = completion.sha.short(),
            exit_code = ?completion.status.and_then(|s| s.code()),
            timed_out = completion.timed_out,
            "test script finished"
        );
        Ok(completion)
    }
}
