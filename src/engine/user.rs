use std::collections::VecDeque;

use crate::target::Target;
use crate::{DEFAULT_TOPIC, Variables};

/// Per-user conversation state.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub vars: Variables,
    pub topic: String,
    /// Recent messages, newest first.
    pub messages: VecDeque<Target>,
    /// Recent replies, newest first.
    pub replies: VecDeque<Target>,
    capacity: usize,
}

impl UserInfo {
    pub fn new(capacity: usize) -> Self {
        UserInfo {
            vars: Variables::new(),
            topic: DEFAULT_TOPIC.to_string(),
            messages: VecDeque::with_capacity(capacity),
            replies: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one exchange, dropping the oldest when full.
    pub fn remember(&mut self, message: Target, reply: Target) {
        push_bounded(&mut self.messages, message, self.capacity);
        push_bounded(&mut self.replies, reply, self.capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn push_bounded(queue: &mut VecDeque<Target>, item: Target, capacity: usize) {
    if capacity == 0 {
        return;
    }
    while queue.len() >= capacity {
        queue.pop_back();
    }
    queue.push_front(item);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded_and_newest_first() {
        let mut user = UserInfo::new(2);
        for i in 0..3 {
            user.remember(Target::plain(&format!("msg {i}")), Target::plain(&format!("reply {i}")));
        }
        let replies: Vec<_> = user.replies.iter().map(|t| t.raw_text.as_str()).collect();
        assert_eq!(replies, vec!["reply 2", "reply 1"]);
        assert_eq!(user.messages.len(), 2);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut user = UserInfo::new(0);
        user.remember(Target::plain("hi"), Target::plain("hello"));
        assert!(user.replies.is_empty());
    }
}
