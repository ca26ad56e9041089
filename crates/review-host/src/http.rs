//! HTTP implementation of the review-host client.
//!
//! Endpoint layout:
//! - `GET  {api_base}/pulls/{repo}/open`              -> `{"pulls": [...]}`
//! - `GET  {api_base}/pulls/{repo}/{number}`          -> `{"pull": {...}}`
//! - `POST {api_base}/issues/comment/{repo}/{number}` with `{"comment": text}`
//!
//! Listing and detail fetches are unauthenticated; posting a comment
//! authenticates with HTTP basic auth from the combined credential. No
//! retries, no timeout beyond transport defaults.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::api::{
    Comment, CommitSha, Credentials, HostResult, PullDetail, PullSummary, RepoSlug, ReviewHost,
};
use crate::error::ReviewHostError;

/// Default public endpoint of the review host.
pub const DEFAULT_API_BASE: &str = "https://github.com/api/v2/json";

/// Review-host client backed by `reqwest`.
pub struct HttpReviewHost {
    http: reqwest::Client,
    api_base: String,
    credentials: Credentials,
}

impl HttpReviewHost {
    /// Create a client for the given API base URL.
    pub fn new(api_base: &str, credentials: Credentials) -> HostResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("pullci/0.1.0")
            .build()
            .map_err(|e| ReviewHostError::Transport(e.to_string()))?;

        Ok(HttpReviewHost {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: String) -> HostResult<T> {
        let response = self.http.get(&endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReviewHostError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ReviewHostError::MalformedPayload {
                endpoint,
                message: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct OpenPullsPayload {
    pulls: Vec<PullSummary>,
}

#[derive(Deserialize)]
struct PullPayload {
    pull: PullWire,
}

#[derive(Deserialize)]
struct PullWire {
    number: u64,
    head: HeadWire,
    #[serde(default)]
    discussion: Vec<Comment>,
}

#[derive(Deserialize)]
struct HeadWire {
    sha: CommitSha,
    repository: HeadRepositoryWire,
}

#[derive(Deserialize)]
struct HeadRepositoryWire {
    url: String,
}

impl From<PullWire> for PullDetail {
    fn from(wire: PullWire) -> Self {
        PullDetail {
            number: wire.number,
            head_sha: wire.head.sha,
            head_repo_url: wire.head.repository.url,
            discussion: wire.discussion,
        }
    }
}

#[async_trait]
impl ReviewHost for HttpReviewHost {
    async fn list_open_pulls(&self, repo: &RepoSlug) -> HostResult<Vec<PullSummary>> {
        let endpoint = format!("{}/pulls/{}/open", self.api_base, repo);
        let payload: OpenPullsPayload = self.get_json(endpoint).await?;
        Ok(payload.pulls)
    }

    async fn pull_detail(&self, repo: &RepoSlug, number: u64) -> HostResult<PullDetail> {
        let endpoint = format!("{}/pulls/{}/{}", self.api_base, repo, number);
        let payload: PullPayload = self.get_json(endpoint).await?;
        Ok(payload.pull.into())
    }

    async fn post_comment(&self, repo: &RepoSlug, number: u64, body: &str) {
        let endpoint = format!("{}/issues/comment/{}/{}", self.api_base, repo, number);
        let result = self
            .http
            .post(&endpoint)
            .basic_auth(self.credentials.user(), Some(self.credentials.secret()))
            .json(&json!({ "comment": body }))
            .send()
            .await;

        // Best effort: the polling pass never waits on comment delivery.
        match result {
            Ok(response) if response.status().is_success() => {
                debug!(pull = number, "comment posted");
            }
            Ok(response) => {
                warn!(
                    pull = number,
                    status = response.status().as_u16(),
                    "comment rejected by review host"
                );
            }
            Err(err) => {
                warn!(pull = number, error = %err, "failed to post comment");
            }
        }
    }
}
