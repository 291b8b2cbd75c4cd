use super::Message;
use crate::{AgriMindError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Errors from a single completion attempt.
///
/// The gateway uses the variant, never the payload, to decide whether the
/// next candidate gets a backoff delay first.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("rate limited")]
    RateLimited,

    #[error("http status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One-shot chat-completions call against a single model.
///
/// Implementations perform no retries; resilience lives in `LlmGateway`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
        temperature: f32,
    ) -> std::result::Result<String, CompletionError>;
}

/// Configuration for `HttpCompletionClient` loaded from environment variables
#[derive(Debug, Clone)]
pub struct CompletionClientConfig {
    pub api_url: String, // full chat-completions endpoint URL
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for CompletionClientConfig {
    fn default() -> Self {
        Self {
            api_url: std::env::var("LLM_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://openrouter.ai/api/v1/chat/completions".to_string()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("LLM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30_000),
        }
    }
}

/// HTTP client for OpenAI-compatible chat-completions endpoints
#[derive(Clone)]
pub struct HttpCompletionClient {
    http: Client,
    cfg: CompletionClientConfig,
}

impl HttpCompletionClient {
    pub fn new(cfg: CompletionClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| AgriMindError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(CompletionClientConfig::default())
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
        temperature: f32,
    ) -> std::result::Result<String, CompletionError> {
        debug!(target: "completion_client", %model, url = %self.cfg.api_url, "POST chat completion");

        let mut req = self
            .http
            .post(&self.cfg.api_url)
            .header("content-type", "application/json");
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let resp = req
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(target: "completion_client", %model, "Rate limited by completion endpoint");
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(target: "completion_client", %model, %status, body = %body, "Completion endpoint error");
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let val: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(format!("Failed to parse JSON: {e}")))?;
        extract_chat_content(&val).ok_or_else(|| {
            CompletionError::Malformed("Missing choices[0].message.content".to_string())
        })
    }
}

fn extract_chat_content(v: &serde_json::Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
