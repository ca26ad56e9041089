//! PullCI - pull request test trigger bot
//!
//! One invocation is one polling pass over the monitored repository; run it
//! from cron or a systemd timer for continuous operation.
//!
//! The posting credential comes from the `REVIEW_HOST_CREDENTIALS`
//! environment variable (`user:secret`); the process exits before any
//! network call when it is missing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use pullci_core::{init_tracing, BotConfig, Orchestrator};
use review_host::{Credentials, HttpReviewHost};

#[derive(Parser)]
#[command(name = "pullci")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pull request test trigger bot", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "globals.json")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    // Fail fast on a missing credential, before any network traffic.
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(err) => {
            error!("{err}");
            error!("Example: {}=yourname:password123", Credentials::ENV_VAR);
            std::process::exit(1);
        }
    };

    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    let host = HttpReviewHost::new(&config.api_base, credentials)
        .context("Failed to create review-host client")?;

    let orchestrator = Orchestrator::new(Arc::new(host), config)?;
    let report = orchestrator.poll_once().await?;

    info!(
        pulls = report.pulls_seen,
        launched = report.runs_launched,
        failed = report.runs_failed,
        skipped_existing = report.already_claimed,
        "pass finished"
    );

    Ok(())
}
