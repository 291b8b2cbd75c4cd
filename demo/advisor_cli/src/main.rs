mod config;

use agrimind_core::context::ContextAggregator;
use agrimind_core::llm::{GatewayConfig, HttpCompletionClient, LlmGateway};
use agrimind_core::providers::{
    CropRecommendationProvider, OpenMeteoWeather, RainfallNormals, SoilRegistry,
    ThresholdCropModel,
};
use agrimind_core::retrieval::{DocumentMetadata, InMemoryIndex};
use agrimind_core::Advisor;
use config::AdvisorCliConfig;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;

/// Starter passages so retrieval has something to surface out of the box
const SEED_KNOWLEDGE: &[(&str, &str)] = &[
    (
        "fertilizer",
        "Low nitrogen soils benefit from split urea application: half at sowing, the rest at tillering. Soil testing every two seasons keeps doses honest.",
    ),
    (
        "fertilizer",
        "For rice in alkaline soils, zinc sulphate at 25 kg/ha corrects the zinc deficiency that shows up as khaira disease.",
    ),
    (
        "water",
        "Alternate wetting and drying saves up to 30% irrigation water in paddy without yield loss; re-flood when the water level drops 15 cm below the surface.",
    ),
    (
        "pests",
        "Scout for stem borer egg masses weekly after transplanting; a single well-timed release of Trichogramma cards is cheaper than repeated sprays.",
    ),
    (
        "market",
        "Staggered harvesting and on-farm drying to 14% moisture usually earns a better mandi grade than rushing wet grain to market.",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,agrimind_core=info,advisor_cli=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let cfg = AdvisorCliConfig::load();
    info!(
        target = "advisor_cli",
        location = %cfg.location,
        state = %cfg.state,
        "Starting advisory demo"
    );

    // Data providers
    let weather = Arc::new(OpenMeteoWeather::new());
    let soil = Arc::new(SoilRegistry::new());
    let rainfall = Arc::new(RainfallNormals::new());
    let crops = Arc::new(CropRecommendationProvider::new(
        weather.clone(),
        soil.clone(),
        rainfall.clone(),
        Arc::new(ThresholdCropModel),
    ));

    // Knowledge index
    let index = Arc::new(InMemoryIndex::new());
    for (category, text) in SEED_KNOWLEDGE {
        index.insert(
            *text,
            DocumentMetadata {
                source: "seed".to_string(),
                category: category.to_string(),
                location: None,
            },
        );
    }

    // Gateway
    let client = Arc::new(HttpCompletionClient::from_env()?);
    let gateway = LlmGateway::new(client, GatewayConfig::default());

    let advisor = Advisor::new(
        ContextAggregator::new(weather.clone(), soil, rainfall, crops),
        index,
        weather,
        gateway,
    );

    println!(
        "Advisory demo for {}, {}. Ask a question, or use :weather <crop> / :insights <n> / :quit",
        cfg.location, cfg.state
    );

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }

        if let Some(crop) = line.strip_prefix(":weather") {
            let crop = crop.trim();
            let crop = if crop.is_empty() { "rice" } else { crop };
            let report = advisor.weather_insights(&cfg.location, crop).await;
            println!(
                "{}°C, {}% humidity, {} ({} forecast days)",
                report.current_weather.temperature,
                report.current_weather.humidity,
                report.current_weather.condition,
                report.forecast.len()
            );
            for insight in &report.insights {
                println!("[{:?}] {}: {}", insight.kind, insight.message, insight.action);
            }
            continue;
        }

        if let Some(count) = line.strip_prefix(":insights") {
            let count = count.trim().parse::<usize>().unwrap_or(3);
            let extraction = advisor.general_insights(&cfg.location, count).await;
            if extraction.used_fallback() {
                println!("(showing fallback content)");
            }
            for insight in &extraction.items {
                println!("[{:?}] {}: {}", insight.kind, insight.title, insight.description);
            }
            continue;
        }

        let reply = advisor
            .reply(&cfg.session, line, &cfg.location, &cfg.state)
            .await;
        println!("{reply}");
    }

    Ok(())
}
