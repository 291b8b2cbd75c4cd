use crate::llm::Message;
use std::collections::VecDeque;

/// Sliding window of completed conversation turns.
///
/// Each completed turn appends exactly two messages (user, assistant);
/// the oldest entries are dropped once the capacity bound is exceeded.
/// Lives for the session lifetime only, never persisted.
#[derive(Debug)]
pub struct ConversationBuffer {
    /// Maximum number of messages to keep
    capacity: usize,
    /// Messages in chronological order
    messages: VecDeque<Message>,
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self::new(super::DEFAULT_MEMORY_CAPACITY)
    }
}

impl ConversationBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// Record one completed turn. Length is ≤ capacity afterwards.
    pub fn push_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push_back(Message::user(user));
        self.messages.push_back(Message::assistant(assistant));
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// Ordered copy of the retained messages
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
