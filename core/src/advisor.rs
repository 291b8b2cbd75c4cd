//! Pipeline facade: the three entrypoints the serving layer calls.
//!
//! - `reply`: retrieval-augmented chat with per-session memory
//! - `weather_insights`: weather dashboard plus structured insights
//! - `general_insights`: structured farming insights for a location
//!
//! Every entrypoint terminates in a returned value; upstream failures are
//! absorbed into user-safe defaults so the serving layer needs no
//! pipeline-specific error branches.

use crate::context::ContextAggregator;
use crate::insights::{extract, Extraction, GeneralInsight, InsightSource, WeatherInsight};
use crate::llm::{LlmGateway, Message};
use crate::memory::SessionStore;
use crate::prompt::PromptComposer;
use crate::providers::{CurrentWeather, ForecastDay, WeatherProvider};
use crate::retrieval::KnowledgeStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Reply returned when every model candidate failed
const APOLOGY_REPLY: &str =
    "I'm sorry, I encountered an error trying to generate a response. Please try again.";

/// Documents requested per chat query
const CHAT_TOP_K: usize = 2;

/// Insights requested from the weather flow
const WEATHER_INSIGHT_COUNT: usize = 3;

/// Weather dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub current_weather: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
    pub insights: Vec<WeatherInsight>,
}

impl WeatherReport {
    /// Error payload when weather data itself is unavailable
    fn unavailable() -> Self {
        Self {
            current_weather: CurrentWeather {
                temperature: 0,
                humidity: 0,
                rainfall: 0.0,
                wind_speed: 0,
                condition: "Error".to_string(),
            },
            forecast: Vec::new(),
            insights: WeatherInsight::unavailable(),
        }
    }
}

/// The retrieval-augmented conversational pipeline
pub struct Advisor {
    aggregator: ContextAggregator,
    knowledge: Arc<dyn KnowledgeStore>,
    weather: Arc<dyn WeatherProvider>,
    gateway: LlmGateway,
    composer: PromptComposer,
    sessions: SessionStore,
}

impl Advisor {
    pub fn new(
        aggregator: ContextAggregator,
        knowledge: Arc<dyn KnowledgeStore>,
        weather: Arc<dyn WeatherProvider>,
        gateway: LlmGateway,
    ) -> Self {
        Self {
            aggregator,
            knowledge,
            weather,
            gateway,
            composer: PromptComposer::default(),
            sessions: SessionStore::default(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Answer a free-text question with farmer context, retrieved knowledge
    /// and conversation memory. Never returns an error: gateway exhaustion
    /// becomes a fixed apologetic reply (and the failed turn is not
    /// recorded).
    pub async fn reply(
        &self,
        session_id: &str,
        question: &str,
        location: &str,
        state: &str,
    ) -> String {
        let ctx = self.aggregator.gather(location, state).await;

        let documents = match self
            .knowledge
            .query(question, Some(location), CHAT_TOP_K)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                warn!(target: "advisor", error = %e, "Retrieval failed, continuing without documents");
                Vec::new()
            }
        };

        // The buffer lock spans snapshot and append so concurrent turns for
        // one session cannot interleave
        let handle = self.sessions.handle(session_id);
        let mut buffer = handle.lock().await;

        let messages = self
            .composer
            .compose(question, &ctx.render(), &documents, &buffer.snapshot());

        match self.gateway.complete(&messages).await {
            Ok(answer) => {
                // The stored user message is the full composed prompt, so
                // later turns keep their knowledge context
                if let Some(user_prompt) = messages.last() {
                    buffer.push_turn(user_prompt.content.clone(), answer.clone());
                }
                answer
            }
            Err(e) => {
                error!(target: "advisor", error = %e, "Gateway exhausted, returning apology reply");
                APOLOGY_REPLY.to_string()
            }
        }
    }

    /// Weather dashboard for a location and crop: current conditions, 7-day
    /// forecast, and up to three structured insights.
    pub async fn weather_insights(&self, location: &str, crop: &str) -> WeatherReport {
        let bulletin = match self.weather.fetch(location).await {
            Ok(b) => b,
            Err(e) => {
                error!(target: "advisor", error = %e, "Weather fetch failed");
                return WeatherReport::unavailable();
            }
        };

        let summary = weather_summary(&bulletin.current, &bulletin.forecast);
        let messages = weather_insight_messages(location, crop, &summary);

        let insights = match self.gateway.complete(&messages).await {
            Ok(raw) => {
                let extraction =
                    extract::<WeatherInsight>(&raw, WEATHER_INSIGHT_COUNT, WeatherInsight::fallback());
                if extraction.used_fallback() {
                    warn!(target: "advisor", "Weather insight output malformed, using fallback");
                }
                extraction.into_items()
            }
            Err(e) => {
                error!(target: "advisor", error = %e, "Gateway exhausted for weather insights");
                WeatherInsight::fallback()
            }
        };

        WeatherReport {
            current_weather: bulletin.current,
            forecast: bulletin.forecast,
            insights,
        }
    }

    /// Structured farming insights for a location. The discriminated result
    /// lets callers observe whether live or fallback content was served.
    pub async fn general_insights(
        &self,
        location: &str,
        count: usize,
    ) -> Extraction<GeneralInsight> {
        let messages = general_insight_messages(location, count);

        match self.gateway.complete(&messages).await {
            Ok(raw) => {
                let extraction = extract::<GeneralInsight>(&raw, count, GeneralInsight::fallback());
                info!(
                    target: "advisor",
                    %location,
                    count = extraction.items.len(),
                    live = !extraction.used_fallback(),
                    "Generated general insights"
                );
                extraction
            }
            Err(e) => {
                error!(target: "advisor", error = %e, "Gateway exhausted for general insights");
                Extraction {
                    items: GeneralInsight::fallback(),
                    source: InsightSource::Fallback,
                }
            }
        }
    }
}

/// One-line weather summary fed to the insight prompt
fn weather_summary(current: &CurrentWeather, forecast: &[ForecastDay]) -> String {
    let min = forecast
        .iter()
        .map(|d| d.temp)
        .min()
        .unwrap_or(current.temperature);
    let max = forecast
        .iter()
        .map(|d| d.temp)
        .max()
        .unwrap_or(current.temperature);
    format!(
        "The current weather is {}°C with {}% humidity. The 7-day forecast shows temperatures ranging from {:.1}°C to {:.1}°C.",
        current.temperature, current.humidity, min as f64, max as f64
    )
}

/// Fixed instructional template for the weather insight flow
fn weather_insight_messages(location: &str, crop: &str, summary: &str) -> Vec<Message> {
    let system = r#"You are an expert agronomist.
Your task is to generate exactly 3 actionable insights based on the weather data.

CRITICAL: You must return the result as a VALID JSON ARRAY of objects.
Do not include markdown formatting (like ```json). Just the raw JSON array.

Each object must have exactly these fields:
- "type": one of "warning", "info", or "success"
- "message": A clear, descriptive headline (e.g., "High Risk of Fungal Infection").
- "action": A DETAILED recommendation (2-3 sentences) explaining exactly what steps the farmer should take and why. Be specific about treatments or cultural practices.

Example format:
[
    {"type": "warning", "message": "High Fungal Disease Risk", "action": "Due to high humidity, there is a risk of rust. Apply Propiconazole (Tilt) @ 1ml/liter immediately and ensure good drainage in the field to prevent water stagnation."},
    {"type": "info", "message": "Ideal Sowing Conditions", "action": "The current temperature window of 20-25°C is perfect for sowing. Complete sowing within the next 3 days to maximize germination rates."}
]"#;

    let user = format!(
        "Weather Data for {}:\n{}\n\nCrop: {}\n\nGenerate 3 structured insights now.",
        location, summary, crop
    );

    vec![Message::system(system), Message::user(user)]
}

/// Fixed instructional template for the general insight flow
fn general_insight_messages(location: &str, count: usize) -> Vec<Message> {
    let system = format!(
        r#"You are an expert agricultural consultant.
Your task is to generate {count} detailed, actionable farming insights for a farmer in {location}.

CRITICAL: Return the result as a VALID JSON ARRAY of objects.
Do not include markdown formatting (like ```json). Just the raw JSON array.

Each object must have exactly these fields:
- "type": one of "tip", "success", or "warning"
- "title": A short, catchy headline (max 5 words).
- "description": A SUPER DETAILED explanation (2-3 sentences). Explain the 'why' and 'how'.
- "priority": one of "high", "medium", or "low".

Make the insights diverse (soil health, water management, pest control, market trends)."#
    );

    let user = format!("Generate {count} unique farming insights for {location} now.");

    vec![Message::system(system), Message::user(user)]
}
