//! Bounded conversational memory.
//!
//! `ConversationBuffer` is the per-conversation sliding window of chat turns;
//! `SessionStore` keys one buffer per conversation identifier so concurrent
//! users never share history.

mod buffer;
mod sessions;

pub use buffer::ConversationBuffer;
pub use sessions::SessionStore;

/// Default capacity in messages (5 user/assistant turn pairs)
pub const DEFAULT_MEMORY_CAPACITY: usize = 10;
