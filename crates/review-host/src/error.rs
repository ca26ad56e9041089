//! Error types for review-host

use thiserror::Error;

/// Errors that can occur talking to the review host
#[derive(Error, Debug)]
pub enum ReviewHostError {
    /// Endpoint unreachable or the request failed in transit
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The host replied with a non-success status
    #[error("Unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Response body did not decode as the expected payload
    #[error("Malformed payload from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },

    /// Repository identifier is not in `owner/name` form
    #[error("Invalid repository slug: {0}")]
    InvalidRepoSlug(String),

    /// Commit sha was empty or contained non-hex characters
    #[error("Invalid commit sha: {0}")]
    InvalidCommitSha(String),

    /// Posting credential missing from the process environment
    #[error("Environment variable REVIEW_HOST_CREDENTIALS not configured")]
    MissingCredentials,

    /// Posting credential not in `user:secret` form
    #[error("Credentials must be in user:secret form")]
    MalformedCredentials,
}

impl From<reqwest::Error> for ReviewHostError {
    fn from(err: reqwest::Error) -> Self {
        ReviewHostError::Transport(err.to_string())
    }
}
