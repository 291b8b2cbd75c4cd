use super::FarmerContext;
use crate::providers::{CropAdvisor, RainfallProvider, SoilProvider, WeatherProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Gathers farmer-specific signals from the independent providers.
///
/// Providers are called concurrently; each failure is logged and its field
/// omitted. Aggregation itself never fails; in the worst case the result
/// carries only the location. Retries belong to the providers, not here.
pub struct ContextAggregator {
    weather: Arc<dyn WeatherProvider>,
    soil: Arc<dyn SoilProvider>,
    rainfall: Arc<dyn RainfallProvider>,
    crops: Arc<dyn CropAdvisor>,
}

impl ContextAggregator {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        soil: Arc<dyn SoilProvider>,
        rainfall: Arc<dyn RainfallProvider>,
        crops: Arc<dyn CropAdvisor>,
    ) -> Self {
        Self {
            weather,
            soil,
            rainfall,
            crops,
        }
    }

    pub async fn gather(&self, location: &str, state: &str) -> FarmerContext {
        let (soil, rainfall, weather, crops) = tokio::join!(
            self.soil.soil(state, location),
            self.rainfall.annual_rainfall(state, location),
            self.weather.fetch(location),
            self.crops.recommend(state, location),
        );

        let mut ctx = FarmerContext::minimal(location, state);

        match soil {
            Ok(profile) => ctx.soil = Some(profile),
            Err(e) => warn!(target: "context", error = %e, "Soil provider failed, omitting field"),
        }
        match rainfall {
            Ok(mm) => ctx.rainfall_mm = Some(mm),
            Err(e) => {
                warn!(target: "context", error = %e, "Rainfall provider failed, omitting field")
            }
        }
        match weather {
            Ok(bulletin) => ctx.weather = Some(bulletin.current),
            Err(e) => {
                warn!(target: "context", error = %e, "Weather provider failed, omitting field")
            }
        }
        match crops {
            Ok(outlook) => ctx.top_crops = outlook.top_recommendations,
            Err(e) => warn!(target: "context", error = %e, "Crop advisor failed, omitting field"),
        }

        debug!(
            target: "context",
            %location,
            %state,
            has_soil = ctx.soil.is_some(),
            has_rainfall = ctx.rainfall_mm.is_some(),
            has_weather = ctx.weather.is_some(),
            crop_count = ctx.top_crops.len(),
            "Gathered farmer context"
        );
        ctx
    }
}
