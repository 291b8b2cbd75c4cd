//! Structured insights extracted from constrained-format LLM output.
//!
//! Two sibling flows share the extractor: weather insights (warning/info/
//! success with a message and an action) and general farming insights
//! (tip/success/warning with a title, description and priority). Malformed
//! model output never propagates past this module; each flow carries a
//! hand-authored fallback list instead.

mod extractor;

pub use extractor::{extract, strip_code_fence, Extraction, InsightSource};

use serde::{Deserialize, Serialize};

/// Kind of a weather insight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherInsightKind {
    Warning,
    Info,
    Success,
}

/// Actionable recommendation derived from weather data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherInsight {
    #[serde(rename = "type")]
    pub kind: WeatherInsightKind,
    /// Short descriptive headline
    pub message: String,
    /// Detailed recommendation text
    pub action: String,
}

impl WeatherInsight {
    /// Fallback shown when the model's output could not be parsed
    pub fn fallback() -> Vec<Self> {
        vec![Self {
            kind: WeatherInsightKind::Info,
            message: "Weather analysis available".to_string(),
            action: "Check detailed forecast above.".to_string(),
        }]
    }

    /// Payload used when the weather data itself could not be fetched
    pub fn unavailable() -> Vec<Self> {
        vec![Self {
            kind: WeatherInsightKind::Warning,
            message: "Could not fetch weather data.".to_string(),
            action: "Please try again later.".to_string(),
        }]
    }
}

/// Kind of a general farming insight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeneralInsightKind {
    Tip,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Short actionable farming recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralInsight {
    #[serde(rename = "type")]
    pub kind: GeneralInsightKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl GeneralInsight {
    pub fn fallback() -> Vec<Self> {
        vec![
            Self {
                kind: GeneralInsightKind::Tip,
                title: "Soil Moisture Conservation".to_string(),
                description: "Consider using organic mulch to retain soil moisture mainly during the dry spells. This helps in reducing water dependency and improving yield stability.".to_string(),
                priority: Some(Priority::Medium),
            },
            Self {
                kind: GeneralInsightKind::Warning,
                title: "Pest Surveillance".to_string(),
                description: "Regularly monitor your fields for early signs of aphids or stem borers. Early detection can prevent significant crop damage and reduce chemical usage.".to_string(),
                priority: Some(Priority::High),
            },
        ]
    }
}
