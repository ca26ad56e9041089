//! PullCI core - orchestration for the pull request test trigger bot
//!
//! Provides the polling pass that:
//! - Lists open pulls on the monitored repository
//! - Detects the trigger command in each pull's discussion
//! - Claims a per-commit run directory and launches the external test script
//! - Reports pass/fail back as a comment
//!
//! The review-host client lives in the `review-host` crate; this crate only
//! depends on its trait, so tests drive the orchestrator with the in-memory
//! fake.

pub mod config;
pub mod orchestrator;
pub mod runner;
pub mod telemetry;
pub mod trigger;
pub mod workspace;

// Re-export key types
pub use config::{BotConfig, ConfigError};
pub use orchestrator::{Orchestrator, PassReport};
pub use runner::{RunCompletion, RunnerError, TestRunner};
pub use telemetry::init_tracing;
pub use trigger::TriggerCommand;
pub use workspace::{RunWorkspace, FAILURE_MARKER};
