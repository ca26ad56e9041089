//! One polling pass over the monitored repository.
//!
//! The orchestrator ties the other components together: list open pulls,
//! then for each pull independently fetch its discussion, look for the
//! trigger command, claim the commit's run directory, launch the test
//! script and report the outcome back as a comment.
//!
//! Pulls never affect each other: a failed detail fetch skips that pull
//! only, and completion order follows subprocess exit order, not listing
//! order. Only the initial listing is fatal for a pass.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use review_host::{RepoSlug, ReviewHost};

use crate::config::{BotConfig, ConfigError};
use crate::runner::TestRunner;
use crate::trigger::TriggerCommand;
use crate::workspace::RunWorkspace;

/// Posted when a run is claimed, before the script is spawned.
pub const STARTING_COMMENT: &str =
    "Starting tests... Results will be reported as a comment here.";

fn passed_comment(mins: f64) -> String {
    format!("All tests passed. Test time: {mins:.2} mins")
}

fn failed_comment(mins: f64) -> String {
    format!("Tests **DID NOT** pass. Test time: {mins:.2} mins")
}

/// Counters from one polling pass.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Open pulls returned by the listing.
    pub pulls_seen: usize,
    /// Pulls whose detail fetch failed and were skipped.
    pub detail_failures: usize,
    /// Pulls with a trigger command whose commit was already claimed.
    pub already_claimed: usize,
    /// Test runs launched and awaited to completion this pass.
    pub runs_launched: usize,
    /// Claimed runs whose script could not be spawned or awaited.
    pub launch_failures: usize,
    /// Completed runs that left the failure marker behind.
    pub runs_failed: usize,
}

/// What one pull's task did, folded into the `PassReport`.
enum PullOutcome {
    NoTrigger,
    DetailFailed,
    AlreadyClaimed,
    LaunchFailed,
    Completed { failed: bool },
}

impl PassReport {
    fn absorb(&mut self, outcome: PullOutcome) {
        match outcome {
            PullOutcome::NoTrigger => {}
            PullOutcome::DetailFailed => self.detail_failures += 1,
            PullOutcome::AlreadyClaimed => self.already_claimed += 1,
            PullOutcome::LaunchFailed => self.launch_failures += 1,
            PullOutcome::Completed { failed } => {
                self.runs_launched += 1;
                if failed {
                    self.runs_failed += 1;
                }
            }
        }
    }
}

/// Polling-pass orchestrator.
pub struct Orchestrator {
    host: Arc<dyn ReviewHost>,
    workspace: RunWorkspace,
    runner: TestRunner,
    trigger: TriggerCommand,
    config: BotConfig,
    limiter: Option<Arc<Semaphore>>,
}

impl Orchestrator {
    /// Wire up a pass from the loaded configuration.
    pub fn new(host: Arc<dyn ReviewHost>, config: BotConfig) -> Result<Self, ConfigError> {
        let trigger = TriggerCommand::new(&config.botname)?;
        let workspace = RunWorkspace::new(&config.pulls_path);
        let runner = TestRunner::new(&config.runner_script)
            .with_timeout(config.run_timeout_secs.map(Duration::from_secs));
        let limiter = config
            .max_concurrent_runs
            .map(|permits| Arc::new(Semaphore::new(permits)));
        Ok(Orchestrator {
            host,
            workspace,
            runner,
            trigger,
            config,
            limiter,
        })
    }

    /// Run one polling pass.
    ///
    /// A listing failure is fatal for the whole pass; everything after that
    /// is isolated per pull. The returned report is informational only:
    /// every externally visible effect (comments, run directories, spawned
    /// scripts) has already happened by the time it is returned.
    pub async fn poll_once(&self) -> Result<PassReport> {
        let started_at = Utc::now();
        let pulls = self
            .host
            .list_open_pulls(&self.config.main_repo)
            .await
            .context("Failed to list open pull requests")?;
        info!(repo = %self.config.main_repo, pulls = pulls.len(), "found open pull requests");

        let ref_repo_url = self.config.ref_repo_url();
        let mut tasks = JoinSet::new();
        for pull in &pulls {
            let task = PullTask {
                host: self.host.clone(),
                workspace: self.workspace.clone(),
                runner: self.runner.clone(),
                trigger: self.trigger.clone(),
                repo: self.config.main_repo.clone(),
                ref_repo_url: ref_repo_url.clone(),
                limiter: self.limiter.clone(),
                number: pull.number,
            };
            tasks.spawn(async move { task.process().await });
        }

        let mut report = PassReport {
            started_at,
            finished_at: started_at,
            pulls_seen: pulls.len(),
            detail_failures: 0,
            already_claimed: 0,
            runs_launched: 0,
            launch_failures: 0,
            runs_failed: 0,
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.absorb(outcome),
                Err(err) => error!(error = %err, "pull task panicked"),
            }
        }

        report.finished_at = Utc::now();
        info!(
            launched = report.runs_launched,
            failed = report.runs_failed,
            skipped_existing = report.already_claimed,
            "polling pass complete"
        );
        Ok(report)
    }
}

/// Everything one pull's task needs, owned so it can move into the JoinSet.
struct PullTask {
    host: Arc<dyn ReviewHost>,
    workspace: RunWorkspace,
    runner: TestRunner,
    trigger: TriggerCommand,
    repo: RepoSlug,
    ref_repo_url: String,
    limiter: Option<Arc<Semaphore>>,
    number: u64,
}

impl PullTask {
    async fn process(self) -> PullOutcome {
        let detail = match self.host.pull_detail(&self.repo, self.number).await {
            Ok(detail) => detail,
            Err(err) => {
                warn!(pull = self.number, error = %err, "skipping pull: detail fetch failed");
                return PullOutcome::DetailFailed;
            }
        };

        if !self.trigger.is_requested(&detail.discussion) {
            return PullOutcome::NoTrigger;
        }
        info!(pull = detail.number, sha = detail.head_sha.short(), "found bot command");

        // Exclusive create of the run directory is the sole deduplication
        // mechanism; losing the claim means another pass (or an earlier
        // run) owns this commit.
        match self.workspace.try_claim(&detail.head_sha) {
            Ok(true) => {}
            Ok(false) => {
                info!(
                    pull = detail.number,
                    sha = detail.head_sha.short(),
                    "target directory already exists"
                );
                return PullOutcome::AlreadyClaimed;
            }
            Err(err) => {
                error!(pull = detail.number, error = %err, "could not claim run directory");
                return PullOutcome::LaunchFailed;
            }
        }

        // The cap gates the expensive part only; fetching and claiming
        // above stay eager.
        let _permit = match &self.limiter {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .expect("run limiter is never closed"),
            ),
            None => None,
        };

        info!(pull = detail.number, "target directory clear, spawning test script");
        self.host
            .post_comment(&self.repo, detail.number, STARTING_COMMENT)
            .await;

        let completion = match self
            .runner
            .run(
                &detail.head_repo_url,
                &self.ref_repo_url,
                &detail.head_sha,
                self.workspace.root(),
            )
            .await
        {
            Ok(completion) => completion,
            Err(err) => {
                error!(pull = detail.number, error = %err, "test script launch failed");
                return PullOutcome::LaunchFailed;
            }
        };

        // The marker file is the only pass/fail authority. The exit status
        // was logged by the launcher but is deliberately not consulted.
        let mins = completion.elapsed_minutes();
        let failed = self.workspace.run_failed(&detail.head_sha);
        if failed {
            info!(pull = detail.number, mins = %format!("{mins:.2}"), "tests DID NOT pass");
            self.host
                .post_comment(&self.repo, detail.number, &failed_comment(mins))
                .await;
        } else {
            info!(pull = detail.number, mins = %format!("{mins:.2}"), "all tests passed");
            self.host
                .post_comment(&self.repo, detail.number, &passed_comment(mins))
                .await;
        }
        PullOutcome::Completed { failed }
    }
}
