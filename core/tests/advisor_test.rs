//! End-to-end pipeline tests with a scripted completion client.

use agrimind_core::context::ContextAggregator;
use agrimind_core::insights::{GeneralInsightKind, InsightSource, WeatherInsightKind};
use agrimind_core::llm::{CompletionClient, CompletionError, GatewayConfig, LlmGateway, Message};
use agrimind_core::prompt::LANGUAGE_INSTRUCTION;
use agrimind_core::providers::{
    CropAdvisor, CropOutlook, CropScore, CurrentWeather, ForecastDay, RainfallNormals,
    SoilRegistry, WeatherBulletin, WeatherProvider,
};
use agrimind_core::retrieval::{DocumentMetadata, InMemoryIndex};
use agrimind_core::{Advisor, AgriMindError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Completion client that replays a fixed script and records every message
/// sequence it was sent.
struct ScriptedClient {
    script: Mutex<Vec<std::result::Result<String, CompletionError>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    fn new(script: Vec<std::result::Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_string())])
    }

    fn last_messages(&self) -> Vec<Message> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn chat(
        &self,
        _model: &str,
        messages: &[Message],
        _max_tokens: u32,
        _temperature: f32,
    ) -> std::result::Result<String, CompletionError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Ok("scripted default reply".to_string());
        }
        script.remove(0)
    }
}

struct UpWeather;

#[async_trait]
impl WeatherProvider for UpWeather {
    async fn fetch(&self, _location: &str) -> Result<WeatherBulletin> {
        Ok(WeatherBulletin {
            current: CurrentWeather {
                temperature: 31,
                humidity: 45,
                rainfall: 0.0,
                wind_speed: 8,
                condition: "Clear".to_string(),
            },
            forecast: vec![
                ForecastDay {
                    day: "Mon".to_string(),
                    temp: 33,
                    rain: 0.0,
                    condition: "Clear".to_string(),
                },
                ForecastDay {
                    day: "Tue".to_string(),
                    temp: 29,
                    rain: 2.4,
                    condition: "Rain".to_string(),
                },
            ],
        })
    }
}

struct DownWeather;

#[async_trait]
impl WeatherProvider for DownWeather {
    async fn fetch(&self, _location: &str) -> Result<WeatherBulletin> {
        Err(AgriMindError::ProviderError("weather offline".to_string()))
    }
}

struct FixedCrops;

#[async_trait]
impl CropAdvisor for FixedCrops {
    async fn recommend(&self, _state: &str, _district: &str) -> Result<CropOutlook> {
        Ok(CropOutlook {
            top_recommendations: vec![
                CropScore {
                    crop: "Rice".to_string(),
                    confidence: 81.3,
                },
                CropScore {
                    crop: "Maize".to_string(),
                    confidence: 10.2,
                },
            ],
        })
    }
}

fn gateway_cfg() -> GatewayConfig {
    GatewayConfig {
        candidates: vec!["model-a".to_string(), "model-b".to_string()],
        max_tokens: 500,
        temperature: 0.7,
        rate_limit_backoff_ms: 100,
    }
}

fn seeded_index() -> Arc<InMemoryIndex> {
    let index = InMemoryIndex::new();
    index.insert(
        "Low nitrogen soils benefit from split urea application at tillering for rice.",
        DocumentMetadata {
            source: "kb".to_string(),
            category: "fertilizer".to_string(),
            location: None,
        },
    );
    index.insert(
        "Zinc sulphate corrects micronutrient deficiency common in rice paddies.",
        DocumentMetadata {
            source: "kb".to_string(),
            category: "fertilizer".to_string(),
            location: None,
        },
    );
    Arc::new(index)
}

fn advisor_with(
    weather: Arc<dyn WeatherProvider>,
    client: Arc<ScriptedClient>,
) -> Advisor {
    let aggregator = ContextAggregator::new(
        weather.clone(),
        Arc::new(SoilRegistry::new()),
        Arc::new(RainfallNormals::new()),
        Arc::new(FixedCrops),
    );
    Advisor::new(
        aggregator,
        seeded_index(),
        weather,
        LlmGateway::new(client, gateway_cfg()),
    )
}

#[tokio::test]
async fn fertilizer_scenario_renders_soil_stats_into_the_system_prompt() {
    let client = ScriptedClient::replying("Apply urea in two split doses after transplanting.");
    let advisor = advisor_with(Arc::new(UpWeather), client.clone());

    let reply = advisor
        .reply(
            "farmer-1",
            "What fertilizer for rice in low nitrogen soil?",
            "Ludhiana",
            "Punjab",
        )
        .await;

    assert!(!reply.is_empty());
    assert_eq!(reply, "Apply urea in two split doses after transplanting.");

    let messages = client.last_messages();
    let system = &messages[0].content;
    assert!(system.contains("Nitrogen 260"));
    assert!(system.contains("pH 8.1"));
    assert!(system.contains("Ludhiana, Punjab"));
    assert!(system.contains(LANGUAGE_INSTRUCTION));

    let user = &messages.last().unwrap().content;
    assert!(user.contains("Question: What fertilizer for rice in low nitrogen soil?"));
    assert!(user.contains("Knowledge Base:"));
    assert!(user.contains("split urea application"));
}

#[tokio::test]
async fn weather_outage_omits_only_the_weather_line() {
    let client = ScriptedClient::replying("ok");
    let advisor = advisor_with(Arc::new(DownWeather), client.clone());

    advisor
        .reply("farmer-1", "How is my soil?", "Ludhiana", "Punjab")
        .await;

    let system = &client.last_messages()[0].content;
    assert!(!system.contains("Current Weather"));
    assert!(system.contains("Soil Health"));
    assert!(system.contains("Annual Rainfall"));
    assert!(system.contains("Top Recommended Crops"));
}

#[tokio::test]
async fn memory_grows_by_turns_and_stays_bounded() {
    let client = ScriptedClient::new(Vec::new());
    let advisor = advisor_with(Arc::new(UpWeather), client.clone());

    for n in 1..=7 {
        advisor
            .reply("farmer-1", &format!("question {n}"), "Ludhiana", "Punjab")
            .await;

        let len = advisor
            .sessions()
            .handle("farmer-1")
            .lock()
            .await
            .len();
        assert_eq!(len, (2 * n).min(10));
    }

    // Each turn's prompt includes at most the bounded history plus the
    // system and current user messages
    let messages = client.last_messages();
    assert!(messages.len() <= 12);
}

#[tokio::test]
async fn sessions_do_not_share_memory() {
    let client = ScriptedClient::new(Vec::new());
    let advisor = advisor_with(Arc::new(UpWeather), client.clone());

    advisor.reply("alice", "q", "Ludhiana", "Punjab").await;
    advisor.reply("alice", "q2", "Ludhiana", "Punjab").await;
    advisor.reply("bob", "q", "Ludhiana", "Punjab").await;

    assert_eq!(advisor.sessions().handle("alice").lock().await.len(), 4);
    assert_eq!(advisor.sessions().handle("bob").lock().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_gateway_returns_apology_and_records_nothing() {
    let client = ScriptedClient::new(vec![
        Err(CompletionError::RateLimited),
        Err(CompletionError::Http {
            status: 500,
            body: "down".to_string(),
        }),
    ]);
    let advisor = advisor_with(Arc::new(UpWeather), client.clone());

    let reply = advisor.reply("farmer-1", "hello?", "Ludhiana", "Punjab").await;

    assert!(reply.starts_with("I'm sorry"));
    assert!(advisor.sessions().handle("farmer-1").lock().await.is_empty());
}

#[tokio::test]
async fn rate_limited_first_candidate_still_produces_a_reply() {
    let client = ScriptedClient::new(vec![
        Err(CompletionError::RateLimited),
        Ok("answer from the second model".to_string()),
    ]);
    // Tiny backoff keeps the live sleep negligible
    let aggregator = ContextAggregator::new(
        Arc::new(UpWeather),
        Arc::new(SoilRegistry::new()),
        Arc::new(RainfallNormals::new()),
        Arc::new(FixedCrops),
    );
    let advisor = Advisor::new(
        aggregator,
        seeded_index(),
        Arc::new(UpWeather),
        LlmGateway::new(
            client,
            GatewayConfig {
                rate_limit_backoff_ms: 1,
                ..gateway_cfg()
            },
        ),
    );

    let reply = advisor.reply("s", "hello?", "Ludhiana", "Punjab").await;
    assert_eq!(reply, "answer from the second model");
}

#[tokio::test]
async fn weather_insights_parses_fenced_output() {
    let fenced = "```json\n[\n  {\"type\": \"warning\", \"message\": \"Heat stress\", \"action\": \"Irrigate in the evening to reduce canopy temperature.\"},\n  {\"type\": \"info\", \"message\": \"Dry spell ahead\", \"action\": \"Plan irrigation for the weekend.\"},\n  {\"type\": \"success\", \"message\": \"Good sowing window\", \"action\": \"Proceed with sowing this week.\"}\n]\n```";
    let client = ScriptedClient::replying(fenced);
    let advisor = advisor_with(Arc::new(UpWeather), client.clone());

    let report = advisor.weather_insights("Ludhiana", "rice").await;

    assert_eq!(report.current_weather.temperature, 31);
    assert_eq!(report.forecast.len(), 2);
    assert_eq!(report.insights.len(), 3);
    assert_eq!(report.insights[0].kind, WeatherInsightKind::Warning);

    // Prompt embeds the crop and the forecast range summary
    let messages = client.last_messages();
    assert!(messages[1].content.contains("Crop: rice"));
    assert!(messages[1].content.contains("from 29.0°C to 33.0°C"));
}

#[tokio::test]
async fn weather_insights_fall_back_on_malformed_output() {
    let client = ScriptedClient::replying("Sorry, here are some thoughts in prose...");
    let advisor = advisor_with(Arc::new(UpWeather), client);

    let report = advisor.weather_insights("Ludhiana", "rice").await;

    assert_eq!(report.insights.len(), 1);
    assert_eq!(report.insights[0].kind, WeatherInsightKind::Info);
    assert_eq!(report.insights[0].message, "Weather analysis available");
}

#[tokio::test]
async fn weather_insights_survive_a_dead_weather_provider() {
    let client = ScriptedClient::new(Vec::new());
    let advisor = advisor_with(Arc::new(DownWeather), client);

    let report = advisor.weather_insights("Ludhiana", "rice").await;

    assert_eq!(report.current_weather.condition, "Error");
    assert!(report.forecast.is_empty());
    assert_eq!(report.insights[0].kind, WeatherInsightKind::Warning);
}

#[tokio::test]
async fn general_insights_report_live_source() {
    let raw = r#"[
        {"type": "tip", "title": "Mulch now", "description": "Mulch conserves moisture through dry spells and suppresses weeds.", "priority": "medium"},
        {"type": "warning", "title": "Aphid watch", "description": "Scout weekly; early sprays stop outbreaks cheaply.", "priority": "high"}
    ]"#;
    let client = ScriptedClient::replying(raw);
    let advisor = advisor_with(Arc::new(UpWeather), client);

    let extraction = advisor.general_insights("Ludhiana", 2).await;

    assert_eq!(extraction.source, InsightSource::Live);
    assert_eq!(extraction.items.len(), 2);
    assert_eq!(extraction.items[0].kind, GeneralInsightKind::Tip);
}

#[tokio::test]
async fn general_insights_fall_back_on_parse_failure() {
    let client = ScriptedClient::replying("not json at all");
    let advisor = advisor_with(Arc::new(UpWeather), client);

    let extraction = advisor.general_insights("Ludhiana", 5).await;

    assert_eq!(extraction.source, InsightSource::Fallback);
    assert_eq!(extraction.items.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn general_insights_fall_back_when_gateway_is_exhausted() {
    let client = ScriptedClient::new(vec![
        Err(CompletionError::RateLimited),
        Err(CompletionError::RateLimited),
    ]);
    let advisor = advisor_with(Arc::new(UpWeather), client);

    let extraction = advisor.general_insights("Ludhiana", 3).await;

    assert!(extraction.used_fallback());
    assert!(!extraction.items.is_empty());
}
