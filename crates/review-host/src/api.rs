//! Review-host wire types and the `ReviewHost` client trait.
//!
//! The types mirror what the host actually sends:
//! - `PullSummary`: one row of the open-pulls listing
//! - `PullDetail`: a single pull with its head commit and discussion
//! - `Comment`: one entry of a pull's discussion thread
//!
//! All trait methods are async and backend-agnostic. An in-memory fake is
//! provided for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReviewHostError;

/// Result type for review-host operations
pub type HostResult<T> = std::result::Result<T, ReviewHostError>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Repository identifier in `owner/name` form.
///
/// The inner field is private to guarantee the slug has exactly one `/`
/// separating two non-empty segments, validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct RepoSlug(String);

impl RepoSlug {
    /// Return the full `owner/name` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoSlug {
    type Error = ReviewHostError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoSlug(s))
            }
            _ => Err(ReviewHostError::InvalidRepoSlug(s)),
        }
    }
}

impl std::str::FromStr for RepoSlug {
    type Err = ReviewHostError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RepoSlug::try_from(s.to_string())
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commit identifier (hex string).
///
/// Shas name run directories on disk, so validation also guarantees the
/// string carries no path separators: non-empty, ASCII hex digits only,
/// normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct CommitSha(String);

impl CommitSha {
    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars), for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for CommitSha {
    type Error = ReviewHostError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReviewHostError::InvalidCommitSha(s));
        }
        Ok(CommitSha(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for CommitSha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Pulls and discussions
// ---------------------------------------------------------------------------

/// One row of the open-pulls listing, used only to drive the detail fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSummary {
    /// Pull number, unique per repository.
    pub number: u64,
}

/// Discussion entry type as reported by the review host.
///
/// Only `IssueComment` entries can carry a trigger command; review-diff
/// comments and anything the host adds later map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum CommentKind {
    IssueComment,
    Other,
}

impl From<String> for CommentKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "IssueComment" => CommentKind::IssueComment,
            _ => CommentKind::Other,
        }
    }
}

/// One entry of a pull's discussion thread. Read-only, sourced from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Entry type; trigger commands are only honored on issue comments.
    #[serde(rename = "type")]
    pub kind: CommentKind,
    /// Comment text; the host omits it for some entry types.
    #[serde(default)]
    pub body: Option<String>,
}

/// A single pull request with its head commit and discussion thread.
///
/// Owned by one polling iteration; never persisted.
#[derive(Debug, Clone)]
pub struct PullDetail {
    pub number: u64,
    /// Most recent commit on the pull's branch.
    pub head_sha: CommitSha,
    /// Clone URL of the fork the pull comes from.
    pub head_repo_url: String,
    pub discussion: Vec<Comment>,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Combined `user:secret` posting credential.
///
/// Read once at startup from `REVIEW_HOST_CREDENTIALS`; the bot never posts
/// anonymously, so a missing credential is a fatal configuration error.
#[derive(Clone)]
pub struct Credentials {
    user: String,
    secret: String,
}

impl Credentials {
    /// Environment variable the credential is read from.
    pub const ENV_VAR: &'static str = "REVIEW_HOST_CREDENTIALS";

    /// Parse a combined `user:secret` string.
    pub fn parse(raw: &str) -> HostResult<Self> {
        match raw.split_once(':') {
            Some((user, secret)) if !user.is_empty() && !secret.is_empty() => Ok(Credentials {
                user: user.to_string(),
                secret: secret.to_string(),
            }),
            _ => Err(ReviewHostError::MalformedCredentials),
        }
    }

    /// Read the credential from the process environment.
    pub fn from_env() -> HostResult<Self> {
        match std::env::var(Self::ENV_VAR) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Err(ReviewHostError::MissingCredentials),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never let the secret reach a log line.
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ReviewHost — client trait
// ---------------------------------------------------------------------------

/// Review-host client.
///
/// Guarantees:
/// - `list_open_pulls` and `pull_detail` surface transport and decode
///   failures to the caller; nothing is retried.
/// - `post_comment` is best effort: delivery failures are logged by the
///   implementation and never propagate. Callers must not depend on a
///   comment having landed.
#[async_trait]
pub trait ReviewHost: Send + Sync {
    /// List open pull requests for `repo`.
    async fn list_open_pulls(&self, repo: &RepoSlug) -> HostResult<Vec<PullSummary>>;

    /// Fetch one pull with its head commit and full discussion thread.
    async fn pull_detail(&self, repo: &RepoSlug, number: u64) -> HostResult<PullDetail>;

    /// Post `body` as an issue comment on the pull. Best effort.
    async fn post_comment(&self, repo: &RepoSlug, number: u64, body: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_slug_accepts_owner_name() {
        let slug: RepoSlug = "mozilla/pdf.js".parse().unwrap();
        assert_eq!(slug.as_str(), "mozilla/pdf.js");
        assert_eq!(slug.to_string(), "mozilla/pdf.js");
    }

    #[test]
    fn repo_slug_rejects_bad_forms() {
        for bad in ["", "noslash", "/name", "owner/", "a/b/c"] {
            assert!(
                bad.parse::<RepoSlug>().is_err(),
                "slug {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn commit_sha_accepts_hex_and_lowercases() {
        let sha = CommitSha::try_from("ABCDEF0123".to_string()).unwrap();
        assert_eq!(sha.as_str(), "abcdef0123");
    }

    #[test]
    fn commit_sha_short_form() {
        let sha = CommitSha::try_from("0123456789abcdef0123456789abcdef01234567".to_string())
            .unwrap();
        assert_eq!(sha.short(), "0123456789ab");
    }

    #[test]
    fn commit_sha_rejects_non_hex() {
        // Shas become directory names; path separators must never pass.
        for bad in ["", "xyz", "../escape", "abc/def"] {
            assert!(
                CommitSha::try_from(bad.to_string()).is_err(),
                "sha {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn comment_kind_maps_unknown_types_to_other() {
        let comment: Comment =
            serde_json::from_str(r#"{"type": "PullRequestReviewComment", "body": "lgtm"}"#)
                .unwrap();
        assert_eq!(comment.kind, CommentKind::Other);
    }

    #[test]
    fn comment_body_may_be_absent() {
        let comment: Comment = serde_json::from_str(r#"{"type": "IssueComment"}"#).unwrap();
        assert_eq!(comment.kind, CommentKind::IssueComment);
        assert!(comment.body.is_none());
    }

    #[test]
    fn credentials_parse_user_secret() {
        let credentials = Credentials::parse("bot:hunter2").unwrap();
        assert_eq!(credentials.user(), "bot");
        assert_eq!(credentials.secret(), "hunter2");
    }

    #[test]
    fn credentials_reject_missing_separator() {
        assert!(matches!(
            Credentials::parse("justauser"),
            Err(ReviewHostError::MalformedCredentials)
        ));
        assert!(Credentials::parse(":secret").is_err());
        assert!(Credentials::parse("user:").is_err());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let credentials = Credentials::parse("bot:hunter2").unwrap();
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("bot"));
        assert!(!rendered.contains("hunter2"));
    }
}
