//! Context data providers.
//!
//! Each provider is an independent upstream collaborator behind an async
//! trait: live weather (Open-Meteo), district soil health, annual rainfall
//! normals, and crop recommendation on top of an opaque scoring model.
//! Failures are provider-local; the aggregator decides what to omit.

pub mod crops;
pub mod rainfall;
pub mod soil;
pub mod weather;

pub use crops::{CropAdvisor, CropFeatures, CropModel, CropOutlook, CropRecommendationProvider, CropScore, ThresholdCropModel};
pub use rainfall::{RainfallNormals, RainfallProvider};
pub use soil::{SoilProfile, SoilProvider, SoilRegistry};
pub use weather::{CurrentWeather, ForecastDay, OpenMeteoWeather, WeatherBulletin, WeatherProvider};

/// Which tier of a fetch-or-default chain produced a value.
///
/// Data-backed providers resolve district first, then fall back to the state
/// average, then to a national default, and report which tier answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    District,
    StateAverage,
    NationalDefault,
}
