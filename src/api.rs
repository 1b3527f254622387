use std::time::Duration;

use crate::engine::ReplyStep;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// How many levels of `<reference>` expansion a reply may go through.
    pub depth_limit: usize,
    /// How many recent messages and replies are kept per user.
    pub history_len: usize,
    /// Seed for random reply choice. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Options {
    pub const DEFAULT_DEPTH_LIMIT: usize = 50;
    pub const DEFAULT_HISTORY_LEN: usize = 10;
}

impl Default for Options {
    fn default() -> Self {
        Options { depth_limit: Self::DEFAULT_DEPTH_LIMIT, history_len: Self::DEFAULT_HISTORY_LEN, seed: None }
    }
}

/// Result of [`Engine::reply_verbose`](crate::Engine::reply_verbose).
///
/// Meant for debugging scripts: which rules fired at each depth and how long
/// the reply took.
#[derive(Debug, Clone)]
pub struct ReplyDetails {
    pub user: String,
    pub message: String,
    pub reply: String,
    /// The user's topic when the message arrived.
    pub topic_before: String,
    /// The user's topic after the reply.
    pub topic_after: String,
    pub steps: Vec<ReplyStep>,
    pub total: Duration,
}

impl ReplyDetails {
    /// Name of the rule that answered the message itself, if any.
    pub fn top_rule(&self) -> Option<&str> {
        self.steps.iter().find(|s| s.depth == 0).and_then(|s| s.rule.as_deref())
    }

    pub fn max_depth(&self) -> usize {
        self.steps.iter().map(|s| s.depth).max().unwrap_or(0)
    }
}
