//! One-shot commit text.
//!
//! The engine accumulates finalized text in a `CommitMailbox`; the host
//! picks it up with `drain`, which empties the slot. Draining is the only
//! projection with a side effect and is not idempotent.

use serde::{Deserialize, Serialize};

/// Finalized text handed to the host text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub text: String,
}

/// Single-slot holder for pending commit text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMailbox {
    pending: String,
}

impl CommitMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the pending commit.
    pub fn post(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    pub fn peek(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take the pending text and clear the slot.
    ///
    /// Returns `None` and leaves the slot untouched when nothing is pending.
    pub fn drain(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_is_at_most_once() {
        let mut mailbox = CommitMailbox::new();
        mailbox.post("你好");

        assert_eq!(mailbox.drain().as_deref(), Some("你好"));
        assert_eq!(mailbox.drain(), None);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_post_accumulates() {
        let mut mailbox = CommitMailbox::new();
        mailbox.post("你");
        mailbox.post("好");
        assert_eq!(mailbox.peek(), "你好");
        assert_eq!(mailbox.drain().as_deref(), Some("你好"));
    }

    #[test]
    fn test_empty_mailbox_drains_nothing() {
        let mut mailbox = CommitMailbox::new();
        mailbox.post("");
        assert_eq!(mailbox.drain(), None);
    }
}
