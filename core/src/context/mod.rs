//! Farmer context assembly.
//!
//! `ContextAggregator` gathers location-derived agronomic signals from the
//! independent data providers and reduces them to one text block for the
//! prompt. Provider failures are tolerated per field; only the fields that
//! actually resolved are rendered.

mod aggregator;

pub use aggregator::ContextAggregator;

use crate::providers::{CropScore, CurrentWeather, SoilProfile};

/// Request-scoped aggregate of a farmer's agronomic signals.
///
/// Built fresh per request, never cached. A `None` field means its provider
/// failed; the rendered block omits it rather than zero-filling.
#[derive(Debug, Clone)]
pub struct FarmerContext {
    pub location: String,
    pub state: String,
    pub soil: Option<SoilProfile>,
    pub rainfall_mm: Option<f64>,
    pub weather: Option<CurrentWeather>,
    pub top_crops: Vec<CropScore>,
}

impl FarmerContext {
    /// Minimal context carrying only the location, used when every provider
    /// failed
    pub fn minimal(location: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            state: state.into(),
            soil: None,
            rainfall_mm: None,
            weather: None,
            top_crops: Vec::new(),
        }
    }

    fn is_minimal(&self) -> bool {
        self.soil.is_none()
            && self.rainfall_mm.is_none()
            && self.weather.is_none()
            && self.top_crops.is_empty()
    }

    /// Render the context block inlined into the system prompt.
    ///
    /// Lines appear only for fields whose provider succeeded.
    pub fn render(&self) -> String {
        if self.is_minimal() {
            return format!("Location: {}, {}", self.location, self.state);
        }

        let mut block = String::from("Farmer Context:\n");
        block.push_str(&format!("- Location: {}, {}\n", self.location, self.state));

        if let Some(soil) = &self.soil {
            block.push_str(&format!(
                "- Soil Health: pH {}, Nitrogen {}, Phosphorus {}, Potassium {}\n",
                soil.ph, soil.n, soil.p, soil.k
            ));
        }
        if let Some(mm) = self.rainfall_mm {
            block.push_str(&format!("- Annual Rainfall: {} mm\n", mm));
        }
        if let Some(weather) = &self.weather {
            block.push_str(&format!(
                "- Current Weather: {}°C, {}% humidity\n",
                weather.temperature, weather.humidity
            ));
        }
        if !self.top_crops.is_empty() {
            let names: Vec<&str> = self.top_crops.iter().map(|c| c.crop.as_str()).collect();
            block.push_str(&format!("- Top Recommended Crops: {}\n", names.join(", ")));
        }

        block
    }
}
