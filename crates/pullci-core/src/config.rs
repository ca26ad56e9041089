//! Bot configuration, loaded once at startup.
//!
//! The config file is JSON (`globals.json` by convention) naming the
//! monitored repository, the reference repository, the run workspace and
//! the trigger pattern. Hardening knobs (per-run timeout, concurrency cap)
//! default to off, matching the bot's historical run-to-completion,
//! launch-everything behavior. There is no ambient global config object:
//! the loaded value is passed by reference to whoever needs it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use review_host::RepoSlug;

/// Errors raised while assembling the startup configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file missing or unreadable
    #[error("Failed to read config file: {0}")]
    Read(String),

    /// Config file did not parse as the expected JSON shape
    #[error("Config file is not valid JSON: {0}")]
    Parse(String),

    /// Trigger pattern did not compile as a regex
    #[error("Invalid trigger pattern: {0}")]
    Trigger(String),
}

/// Startup configuration for one bot process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Monitored repository, `owner/name`.
    pub main_repo: RepoSlug,

    /// Baseline repository the pull's code is compared against.
    pub ref_repo: RepoSlug,

    /// Root of the per-commit run workspace.
    pub pulls_path: PathBuf,

    /// Trigger pattern; any issue comment matching it requests a run.
    pub botname: String,

    /// Review-host API endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// External test script, spawned once per claimed commit.
    #[serde(default = "default_runner_script")]
    pub runner_script: PathBuf,

    /// Base URL the reference clone URL is built from.
    #[serde(default = "default_git_base")]
    pub git_base: String,

    /// Optional cap on simultaneous test runs. Off by default: every
    /// matching pull's run is launched eagerly.
    #[serde(default)]
    pub max_concurrent_runs: Option<usize>,

    /// Optional per-run timeout in seconds. Off by default: a launched
    /// runner is awaited however long it takes.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

fn default_api_base() -> String {
    review_host::DEFAULT_API_BASE.to_string()
}

fn default_runner_script() -> PathBuf {
    PathBuf::from("./fetch-repo-run-tests")
}

fn default_git_base() -> String {
    "git://github.com".to_string()
}

impl BotConfig {
    /// Load the configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Clone URL of the reference repository,
    /// e.g. `git://github.com/mozilla/pdf.js.git`.
    pub fn ref_repo_url(&self) -> String {
        format!("{}/{}.git", self.git_base.trim_end_matches('/'), self.ref_repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "main_repo": "mozilla/pdf.js",
        "ref_repo": "mozilla/pdf.js",
        "pulls_path": "/var/lib/pullci",
        "botname": "pdfjsbot"
    }"#;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("globals.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let (_dir, path) = write_config(MINIMAL);
        let config = BotConfig::load(&path).unwrap();

        assert_eq!(config.main_repo.as_str(), "mozilla/pdf.js");
        assert_eq!(config.botname, "pdfjsbot");
        assert_eq!(config.api_base, review_host::DEFAULT_API_BASE);
        assert_eq!(config.runner_script, PathBuf::from("./fetch-repo-run-tests"));
        assert!(config.max_concurrent_runs.is_none());
        assert!(config.run_timeout_secs.is_none());
    }

    #[test]
    fn ref_repo_url_appends_git_suffix() {
        let (_dir, path) = write_config(MINIMAL);
        let config = BotConfig::load(&path).unwrap();
        assert_eq!(config.ref_repo_url(), "git://github.com/mozilla/pdf.js.git");
    }

    #[test]
    fn hardening_knobs_parse_when_present() {
        let (_dir, path) = write_config(
            r#"{
                "main_repo": "mozilla/pdf.js",
                "ref_repo": "mozilla/pdf.js",
                "pulls_path": "/var/lib/pullci",
                "botname": "pdfjsbot",
                "max_concurrent_runs": 2,
                "run_timeout_secs": 3600
            }"#,
        );
        let config = BotConfig::load(&path).unwrap();
        assert_eq!(config.max_concurrent_runs, Some(2));
        assert_eq!(config.run_timeout_secs, Some(3600));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = BotConfig::load(Path::new("/nonexistent/globals.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let (_dir, path) = write_config("{not json");
        let err = BotConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_repo_slug_is_a_parse_error() {
        let (_dir, path) = write_config(
            r#"{
                "main_repo": "noslash",
                "ref_repo": "mozilla/pdf.js",
                "pulls_path": "/var/lib/pullci",
                "botname": "pdfjsbot"
            }"#,
        );
        let err = BotConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
