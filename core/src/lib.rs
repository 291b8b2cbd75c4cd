// AgriMind Core Library
// Retrieval-augmented farming advisory pipeline

pub mod advisor;
pub mod context;
pub mod insights;
pub mod llm;
pub mod memory;
pub mod prompt;
pub mod providers;
pub mod retrieval;

// Export core types
pub use advisor::{Advisor, WeatherReport};
pub use context::{ContextAggregator, FarmerContext};
pub use insights::{Extraction, GeneralInsight, InsightSource, WeatherInsight};
pub use llm::{GatewayConfig, HttpCompletionClient, LlmGateway, Message, MessageRole};
pub use memory::{ConversationBuffer, SessionStore};
pub use prompt::PromptComposer;
pub use retrieval::{InMemoryIndex, KnowledgeStore, RetrievedDocument};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriMindError {
    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("retrieval error: {0}")]
    RetrievalError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("all candidate models exhausted")]
    GatewayExhausted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, AgriMindError>;
