//! Trait contract tests for `ReviewHost`.
//!
//! These verify the behavioral contract of the client trait using the
//! in-memory fake. Any conforming implementation must behave the same way.

use review_host::fakes::MemoryReviewHost;
use review_host::{Comment, CommentKind, CommitSha, PullDetail, RepoSlug, ReviewHost, ReviewHostError};

fn repo() -> RepoSlug {
    "mozilla/pdf.js".parse().unwrap()
}

fn sha(hex: &str) -> CommitSha {
    CommitSha::try_from(hex.to_string()).unwrap()
}

fn detail(number: u64, head: &str) -> PullDetail {
    PullDetail {
        number,
        head_sha: sha(head),
        head_repo_url: format!("git://github.com/fork{number}/pdf.js.git"),
        discussion: vec![Comment {
            kind: CommentKind::IssueComment,
            body: Some("hello".to_string()),
        }],
    }
}

// ===========================================================================
// Listing and detail fetches
// ===========================================================================

#[tokio::test]
async fn listing_returns_scripted_pulls_in_order() {
    let host = MemoryReviewHost::new();
    host.add_pull(detail(3, "aaaa01"));
    host.add_pull(detail(8, "bbbb02"));

    let pulls = host.list_open_pulls(&repo()).await.unwrap();
    let numbers: Vec<u64> = pulls.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![3, 8]);
}

#[tokio::test]
async fn detail_round_trips_head_commit() {
    let host = MemoryReviewHost::new();
    host.add_pull(detail(3, "ABCD12"));

    let fetched = host.pull_detail(&repo(), 3).await.unwrap();
    assert_eq!(fetched.number, 3);
    // Shas are normalised to lowercase on the way in.
    assert_eq!(fetched.head_sha.as_str(), "abcd12");
    assert_eq!(fetched.discussion.len(), 1);
}

#[tokio::test]
async fn broken_detail_surfaces_transport_error() {
    let host = MemoryReviewHost::new();
    host.add_broken_pull(5);

    assert_eq!(host.list_open_pulls(&repo()).await.unwrap().len(), 1);
    let err = host.pull_detail(&repo(), 5).await.unwrap_err();
    assert!(matches!(err, ReviewHostError::Transport(_)));
}

#[tokio::test]
async fn broken_listing_surfaces_transport_error() {
    let host = MemoryReviewHost::new();
    host.add_pull(detail(3, "aaaa01"));
    host.break_listing();

    let err = host.list_open_pulls(&repo()).await.unwrap_err();
    assert!(matches!(err, ReviewHostError::Transport(_)));
}

// ===========================================================================
// Comment posting
// ===========================================================================

#[tokio::test]
async fn posted_comments_are_recorded_in_order() {
    let host = MemoryReviewHost::new();
    host.post_comment(&repo(), 3, "first").await;
    host.post_comment(&repo(), 7, "second").await;
    host.post_comment(&repo(), 3, "third").await;

    let bodies: Vec<String> = host
        .posted_comments()
        .into_iter()
        .map(|c| c.body)
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
    assert_eq!(host.comments_for(3), vec!["first", "third"]);
}

#[tokio::test]
async fn posting_never_fails_the_caller() {
    // Best-effort contract: post_comment has no error channel at all, even
    // for a pull the fake has never heard of.
    let host = MemoryReviewHost::new();
    host.post_comment(&repo(), 999, "into the void").await;
    assert_eq!(host.comments_for(999).len(), 1);
}
