//! In-memory fake for the `ReviewHost` trait (testing only)
//!
//! `MemoryReviewHost` serves scripted pulls and records every posted
//! comment so tests can assert on notification traffic without a network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{HostResult, PullDetail, PullSummary, RepoSlug, ReviewHost};
use crate::error::ReviewHostError;

/// A comment recorded by the fake, in posting order.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedComment {
    pub repo: RepoSlug,
    pub number: u64,
    pub body: String,
}

/// In-memory review host with scripted responses.
#[derive(Default)]
pub struct MemoryReviewHost {
    pulls: Mutex<Vec<PullSummary>>,
    details: Mutex<HashMap<u64, PullDetail>>,
    broken_details: Mutex<HashSet<u64>>,
    fail_listing: Mutex<bool>,
    posted: Mutex<Vec<PostedComment>>,
}

impl MemoryReviewHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an open pull together with its detail payload.
    pub fn add_pull(&self, detail: PullDetail) {
        self.pulls.lock().unwrap().push(PullSummary {
            number: detail.number,
        });
        self.details.lock().unwrap().insert(detail.number, detail);
    }

    /// Script an open pull whose detail fetch fails with a transport error.
    pub fn add_broken_pull(&self, number: u64) {
        self.pulls.lock().unwrap().push(PullSummary { number });
        self.broken_details.lock().unwrap().insert(number);
    }

    /// Make the open-pulls listing itself fail.
    pub fn break_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    /// Comments posted so far, in posting order.
    pub fn posted_comments(&self) -> Vec<PostedComment> {
        self.posted.lock().unwrap().clone()
    }

    /// Comments posted to one pull, in posting order.
    pub fn comments_for(&self, number: u64) -> Vec<String> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.number == number)
            .map(|c| c.body.clone())
            .collect()
    }
}

#[async_trait]
impl ReviewHost for MemoryReviewHost {
    async fn list_open_pulls(&self, _repo: &RepoSlug) -> HostResult<Vec<PullSummary>> {
        if *self.fail_listing.lock().unwrap() {
            return Err(ReviewHostError::Transport(
                "scripted listing failure".to_string(),
            ));
        }
        Ok(self.pulls.lock().unwrap().clone())
    }

    async fn pull_detail(&self, _repo: &RepoSlug, number: u64) -> HostResult<PullDetail> {
        if self.broken_details.lock().unwrap().contains(&number) {
            return Err(ReviewHostError::Transport(format!(
                "scripted detail failure for pull {number}"
            )));
        }
        self.details
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| ReviewHostError::MalformedPayload {
                endpoint: format!("pull {number}"),
                message: "no scripted detail".to_string(),
            })
    }

    async fn post_comment(&self, repo: &RepoSlug, number: u64, body: &str) {
        self.posted.lock().unwrap().push(PostedComment {
            repo: repo.clone(),
            number,
            body: body.to_string(),
        });
    }
}
