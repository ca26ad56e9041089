//! Review-host client for PullCI
//!
//! This crate provides everything the bot needs to talk to the code review
//! host: wire types for pulls and their discussion threads, the combined
//! posting credential, and the `ReviewHost` trait with its HTTP
//! implementation.
//!
//! ## Key components
//!
//! - `ReviewHost`: backend-agnostic client trait
//! - `HttpReviewHost`: reqwest-backed implementation
//! - `fakes::MemoryReviewHost`: scripted in-memory host for tests

pub mod api;
mod error;
pub mod fakes;
mod http;

pub use api::{
    Comment, CommentKind, CommitSha, Credentials, HostResult, PullDetail, PullSummary, RepoSlug,
    ReviewHost,
};
pub use error::ReviewHostError;
pub use http::{HttpReviewHost, DEFAULT_API_BASE};
