//! LLM module: chat message types, HTTP completion client, and the fallback gateway
//!
//! This module provides:
//! - `Message`, `MessageRole` for the chat-completions wire protocol
//! - `CompletionClient`, `HttpCompletionClient` for talking to OpenAI-compatible backends
//! - `LlmGateway`, `GatewayConfig` for ordered multi-model fallback with backoff

mod client;
mod gateway;

pub use client::{CompletionClient, CompletionClientConfig, CompletionError, HttpCompletionClient};
pub use gateway::{GatewayConfig, LlmGateway};

use serde::{Deserialize, Serialize};

/// Roles in a chat-completions message sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message in the sequence sent to the completion endpoint.
///
/// Ordering is significant: one leading system message, then prior
/// user/assistant turns, then the current user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = Message::system("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hello");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn user_and_assistant_constructors() {
        assert_eq!(Message::user("q").role, MessageRole::User);
        assert_eq!(Message::assistant("a").role, MessageRole::Assistant);
    }
}
