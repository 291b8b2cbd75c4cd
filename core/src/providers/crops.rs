//! Crop recommendation on top of an opaque scoring model.
//!
//! The provider assembles the feature vector (soil NPK and pH, live
//! temperature and humidity, annual rainfall) and hands it to a `CropModel`.
//! The model itself is a collaborator: the trained classifier lives outside
//! this crate, behind the trait.

use super::{RainfallProvider, SoilProvider, WeatherProvider};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Feature vector handed to the scoring model
#[derive(Debug, Clone, PartialEq)]
pub struct CropFeatures {
    pub n: i32,
    pub p: i32,
    pub k: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

/// One scored crop; confidence is a percentage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropScore {
    pub crop: String,
    pub confidence: f64,
}

/// Ranked recommendation result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropOutlook {
    pub top_recommendations: Vec<CropScore>,
}

/// Opaque scoring function over a feature vector.
///
/// Returns crops with raw probabilities in [0, 1], highest first.
pub trait CropModel: Send + Sync {
    fn score(&self, features: &CropFeatures) -> Vec<CropScore>;
}

/// Crop recommendation collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CropAdvisor: Send + Sync {
    async fn recommend(&self, state: &str, district: &str) -> Result<CropOutlook>;
}

/// Defaults used when the live weather fetch fails
const FALLBACK_TEMPERATURE: f64 = 25.0;
const FALLBACK_HUMIDITY: f64 = 70.0;

/// Assembles features from the data providers and scores them with the model
pub struct CropRecommendationProvider {
    weather: Arc<dyn WeatherProvider>,
    soil: Arc<dyn SoilProvider>,
    rainfall: Arc<dyn RainfallProvider>,
    model: Arc<dyn CropModel>,
}

impl CropRecommendationProvider {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        soil: Arc<dyn SoilProvider>,
        rainfall: Arc<dyn RainfallProvider>,
        model: Arc<dyn CropModel>,
    ) -> Self {
        Self {
            weather,
            soil,
            rainfall,
            model,
        }
    }
}

#[async_trait]
impl CropAdvisor for CropRecommendationProvider {
    async fn recommend(&self, state: &str, district: &str) -> Result<CropOutlook> {
        // The district name doubles as the weather location
        let (temperature, humidity) = match self.weather.fetch(district).await {
            Ok(bulletin) => (
                bulletin.current.temperature as f64,
                bulletin.current.humidity as f64,
            ),
            Err(e) => {
                warn!(target: "crops", error = %e, "Weather fetch failed, using fallback values");
                (FALLBACK_TEMPERATURE, FALLBACK_HUMIDITY)
            }
        };

        let soil = self.soil.soil(state, district).await?;
        let rainfall = self.rainfall.annual_rainfall(state, district).await?;

        let features = CropFeatures {
            n: soil.n,
            p: soil.p,
            k: soil.k,
            temperature,
            humidity,
            ph: soil.ph,
            rainfall,
        };

        let top_recommendations = self
            .model
            .score(&features)
            .into_iter()
            .take(3)
            .map(|s| CropScore {
                crop: titlecase(&s.crop),
                confidence: (s.confidence * 10_000.0).round() / 100.0,
            })
            .collect();

        Ok(CropOutlook {
            top_recommendations,
        })
    }
}

fn titlecase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Band-based stand-in scorer.
///
/// A rough agronomic heuristic over rainfall, temperature and soil pH,
/// normalized to probabilities. Useful for demos and tests; deployments
/// plug a trained classifier in behind `CropModel`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdCropModel;

impl CropModel for ThresholdCropModel {
    fn score(&self, features: &CropFeatures) -> Vec<CropScore> {
        fn add(weights: &mut Vec<(&'static str, f64)>, crop: &'static str, w: f64) {
            match weights.iter_mut().find(|(c, _)| *c == crop) {
                Some((_, existing)) => *existing += w,
                None => weights.push((crop, w)),
            }
        }

        let mut weights: Vec<(&'static str, f64)> = Vec::new();

        if features.rainfall > 1500.0 {
            add(&mut weights, "rice", 4.0);
            add(&mut weights, "jute", 2.0);
            add(&mut weights, "coconut", 1.5);
        } else if features.rainfall > 800.0 {
            add(&mut weights, "rice", 3.0);
            add(&mut weights, "maize", 2.5);
            add(&mut weights, "cotton", 1.5);
        } else {
            add(&mut weights, "chickpea", 3.0);
            add(&mut weights, "cotton", 2.0);
            add(&mut weights, "maize", 1.5);
        }

        if features.temperature > 30.0 {
            add(&mut weights, "mango", 1.5);
        } else if features.temperature < 18.0 {
            add(&mut weights, "apple", 2.0);
        }

        if features.ph < 6.0 {
            add(&mut weights, "coffee", 2.0);
        } else if features.ph > 7.5 && features.n > 200 {
            add(&mut weights, "maize", 1.0);
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        let mut scores: Vec<CropScore> = weights
            .into_iter()
            .map(|(crop, w)| CropScore {
                crop: crop.to_string(),
                confidence: w / total,
            })
            .collect();
        scores.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scores
    }
}
