//! Filesystem-backed record of which commits already have a test run.
//!
//! A run's working directory doubles as its idempotency marker: once
//! `tests/<sha>/` exists, that commit is claimed for good; nothing is ever
//! deleted by the bot. The external runner writes its artifacts under the
//! same directory, including the failure marker checked after it exits.

use std::io;
use std::path::{Path, PathBuf};

use review_host::CommitSha;

/// File the test script writes only when at least one test regressed.
/// Its absence after the runner exits means the run passed.
pub const FAILURE_MARKER: &str = "test/eq.log";

/// Per-commit run directories under `<root>/tests/`.
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    root: PathBuf,
}

impl RunWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RunWorkspace { root: root.into() }
    }

    /// Workspace root, handed to the test script as its fourth argument.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working directory for one commit's run.
    pub fn run_dir(&self, sha: &CommitSha) -> PathBuf {
        self.root.join("tests").join(sha.as_str())
    }

    /// Whether a run has already been started for this commit.
    pub fn run_exists(&self, sha: &CommitSha) -> bool {
        self.run_dir(sha).exists()
    }

    /// Claim the commit by creating its run directory.
    ///
    /// The create is exclusive: of any number of concurrent claimants for
    /// one sha, exactly one sees `Ok(true)`; the rest see `Ok(false)`.
    pub fn try_claim(&self, sha: &CommitSha) -> io::Result<bool> {
        std::fs::create_dir_all(self.root.join("tests"))?;
        match std::fs::create_dir(self.run_dir(sha)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether the runner reported failures.
    ///
    /// Only meaningful once the runner process has exited. The marker is
    /// written by the script, not by the bot, and checking mid-run is racy.
    pub fn run_failed(&self, sha: &CommitSha) -> bool {
        self.run_dir(sha).join(FAILURE_MARKER).exists()
    }
}
