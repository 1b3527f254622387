//! Reply traces.
//!
//! Collection is opt-in: [`Engine::reply`](crate::Engine::reply) records
//! nothing, [`Engine::reply_verbose`](crate::Engine::reply_verbose) records one
//! [`ReplyStep`] per rule search, in the order the searches start. A reference
//! expanded from a reply appears after the step that produced it, one depth
//! level deeper.

use std::time::Duration;

/// One search for a reply, at one recursion depth.
#[derive(Debug, Clone, Default)]
pub struct ReplyStep {
    pub depth: usize,
    /// The topic searched.
    pub topic: String,
    pub input: String,
    pub normalized: String,
    /// Rules tried before one matched (or all of them, if none did).
    pub rules_tried: usize,
    /// Fully qualified name of the rule that matched.
    pub rule: Option<String>,
    /// The handler's text after placeholder filling, before references are expanded.
    pub output: String,
    /// Time spent searching and running the handler.
    pub duration: Duration,
}

impl ReplyStep {
    pub fn matched(&self) -> bool {
        self.rule.is_some()
    }
}
