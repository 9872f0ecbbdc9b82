//! In-memory transcript for a single chat session.
//!
//! The store is append-only: messages are never edited or removed once
//! recorded. It is created at session start, lent to the dispatcher by
//! mutable reference for each turn, and dropped when the session ends.

use std::error::Error;
use std::fmt;

use chrono::Utc;

use crate::core::config::defaults::DEFAULT_GREETING;
use crate::core::message::{Message, TranscriptRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Content was empty once surrounding whitespace was removed.
    InvalidMessage,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::InvalidMessage => write!(f, "message content cannot be empty"),
        }
    }
}

impl Error for MessageError {}

#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Creates a store seeded with a single assistant greeting.
    ///
    /// A blank greeting falls back to the built-in one so the transcript is
    /// never empty.
    pub fn new(greeting: &str) -> Self {
        let greeting = if greeting.trim().is_empty() {
            DEFAULT_GREETING
        } else {
            greeting
        };

        Self {
            messages: vec![Message::new(
                TranscriptRole::Assistant,
                greeting,
                Utc::now(),
            )],
        }
    }

    pub fn append(
        &mut self,
        role: TranscriptRole,
        content: impl Into<String>,
    ) -> Result<Message, MessageError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(MessageError::InvalidMessage);
        }

        // Keep timestamps non-decreasing even if the wall clock steps back.
        let mut timestamp = Utc::now();
        if let Some(last) = self.messages.last() {
            timestamp = timestamp.max(last.timestamp);
        }

        let message = Message::new(role, content, timestamp);
        self.messages.push(message.clone());
        Ok(message)
    }

    #[cfg(test)]
    fn push_recorded(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(count: usize) -> ConversationStore {
        let mut store = ConversationStore::default();
        for i in 0..count {
            let role = if i % 2 == 0 {
                TranscriptRole::User
            } else {
                TranscriptRole::Assistant
            };
            store.append(role, format!("message {i}")).unwrap();
        }
        store
    }

    #[test]
    fn fresh_store_holds_only_the_greeting() {
        let store = ConversationStore::default();
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].role, TranscriptRole::Assistant);
        assert_eq!(store.all()[0].content, DEFAULT_GREETING);
    }

    #[test]
    fn blank_greeting_uses_builtin_text() {
        let store = ConversationStore::new("   ");
        assert_eq!(store.all()[0].content, DEFAULT_GREETING);
    }

    #[test]
    fn append_rejects_whitespace_content() {
        let mut store = ConversationStore::default();
        let err = store
            .append(TranscriptRole::User, " \n\t ")
            .expect_err("blank content should be rejected");
        assert_eq!(err, MessageError::InvalidMessage);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn append_returns_the_stored_message() {
        let mut store = ConversationStore::default();
        let message = store.append(TranscriptRole::User, "hello").unwrap();
        assert_eq!(store.last(), Some(&message));
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn timestamps_never_decrease() {
        let store = store_with(20);
        for pair in store.all().windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn clock_stepping_back_keeps_previous_timestamp() {
        let mut store = ConversationStore::default();
        let future = Utc::now() + chrono::Duration::hours(1);
        store.push_recorded(Message::new(TranscriptRole::User, "from the future", future));

        let message = store.append(TranscriptRole::Assistant, "reply").unwrap();
        assert_eq!(message.timestamp, future);
        assert_eq!(store.last().unwrap().timestamp, future);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let store = store_with(20);
        let recent = store.recent(12);
        assert_eq!(recent.len(), 12);
        assert_eq!(recent, &store.all()[9..]);
        assert_eq!(recent.last().unwrap().content, "message 19");
    }

    #[test]
    fn recent_with_short_history_returns_everything() {
        let store = store_with(2);
        assert_eq!(store.recent(12), store.all());
        assert!(store.recent(0).is_empty());
    }

    #[test]
    fn recent_is_idempotent() {
        let store = store_with(15);
        let first = store.recent(12).to_vec();
        let second = store.recent(12).to_vec();
        assert_eq!(first, second);
    }
}
