use super::ConversationBuffer;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-conversation memory store keyed by session identifier.
///
/// Each buffer sits behind its own async mutex; holding the lock across a
/// snapshot-and-append keeps the alternating turn sequence intact under
/// concurrent requests for the same session.
pub struct SessionStore {
    capacity: usize,
    sessions: DashMap<String, Arc<Mutex<ConversationBuffer>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_MEMORY_CAPACITY)
    }
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sessions: DashMap::new(),
        }
    }

    /// Buffer for the given session, created empty on first use
    pub fn handle(&self, session_id: &str) -> Arc<Mutex<ConversationBuffer>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationBuffer::new(self.capacity))))
            .value()
            .clone()
    }

    /// Drop a session's history. Returns true if it existed.
    pub fn evict(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
