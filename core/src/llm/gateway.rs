use super::{CompletionClient, CompletionError, Message};
use crate::{AgriMindError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for `LlmGateway` loaded from environment variables
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Candidate model identifiers, in priority order
    pub candidates: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Delay before moving to the next candidate after a rate-limit response
    pub rate_limit_backoff_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            candidates: std::env::var("LLM_MODELS")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.split(',')
                        .map(|m| m.trim().to_string())
                        .filter(|m| !m.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| {
                    vec![
                        "deepseek/deepseek-chat-v3-0324:free".to_string(),
                        "meta-llama/llama-3.3-70b-instruct:free".to_string(),
                        "mistralai/mistral-7b-instruct:free".to_string(),
                    ]
                }),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(500),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.7),
            rate_limit_backoff_ms: std::env::var("LLM_RATE_LIMIT_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(2_000),
        }
    }
}

/// Resilience wrapper around a one-shot completion call.
///
/// Walks the candidate list in priority order and returns the first
/// non-empty completion. A rate-limited candidate costs one backoff sleep
/// before the next candidate is tried; every other failure moves on
/// immediately. The same candidate is never retried within one call.
/// The gateway never inspects message semantics.
pub struct LlmGateway {
    client: Arc<dyn CompletionClient>,
    cfg: GatewayConfig,
}

impl LlmGateway {
    pub fn new(client: Arc<dyn CompletionClient>, cfg: GatewayConfig) -> Self {
        Self { client, cfg }
    }

    /// Contract:
    /// - Input: ordered message sequence (system + history + user)
    /// - Output: the first accepted completion text
    /// - Error: `GatewayExhausted` only once every candidate has failed
    pub async fn complete(&self, messages: &[Message]) -> Result<String> {
        for model in &self.cfg.candidates {
            debug!(target: "llm_gateway", %model, "Issuing completion request");

            match self
                .client
                .chat(model, messages, self.cfg.max_tokens, self.cfg.temperature)
                .await
            {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(target: "llm_gateway", %model, "Candidate accepted");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(target: "llm_gateway", %model, "Empty completion, trying next candidate");
                }
                Err(CompletionError::RateLimited) => {
                    warn!(
                        target: "llm_gateway",
                        %model,
                        backoff_ms = self.cfg.rate_limit_backoff_ms,
                        "Rate limited, backing off before next candidate"
                    );
                    tokio::time::sleep(Duration::from_millis(self.cfg.rate_limit_backoff_ms)).await;
                }
                Err(err) => {
                    warn!(target: "llm_gateway", %model, error = %err, "Candidate failed, trying next");
                }
            }
        }

        Err(AgriMindError::GatewayExhausted)
    }
}
