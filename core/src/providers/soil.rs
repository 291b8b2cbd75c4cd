//! District soil-health registry.
//!
//! Parameters mirror Soil Health Card reporting: pH plus available
//! Nitrogen/Phosphorus/Potassium in kg/ha, keyed by STATE → DISTRICT.
//! Lookups resolve through three named tiers: exact district, state
//! average, national default.

use super::ResolutionTier;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Soil parameters for a district
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoilProfile {
    pub ph: f64,
    #[serde(rename = "N")]
    pub n: i32,
    #[serde(rename = "P")]
    pub p: i32,
    #[serde(rename = "K")]
    pub k: i32,
}

/// Soil data collaborator
#[async_trait]
pub trait SoilProvider: Send + Sync {
    async fn soil(&self, state: &str, district: &str) -> Result<SoilProfile>;
}

const NATIONAL_DEFAULT: SoilProfile = SoilProfile {
    ph: 7.0,
    n: 180,
    p: 40,
    k: 300,
};

type DistrictRow = (&'static str, SoilProfile);

const fn profile(ph: f64, n: i32, p: i32, k: i32) -> SoilProfile {
    SoilProfile { ph, n, p, k }
}

static SOIL_TABLE: &[(&str, &[DistrictRow])] = &[
    (
        "HARYANA",
        &[
            ("AMBALA", profile(7.5, 210, 45, 280)),
            ("BHIWANI", profile(8.3, 150, 30, 350)),
            ("HISAR", profile(8.5, 140, 28, 380)),
            ("KARNAL", profile(8.0, 230, 65, 320)),
            ("KURUKSHETRA", profile(7.9, 220, 60, 310)),
            ("ROHTAK", profile(8.2, 180, 40, 340)),
            ("SIRSA", profile(8.6, 135, 25, 400)),
        ],
    ),
    (
        "KARNATAKA",
        &[
            ("BAGALKOT", profile(8.2, 150, 28, 380)),
            ("BELGAUM", profile(7.5, 190, 45, 310)),
            ("BELLARY", profile(8.3, 140, 25, 400)),
            ("CHIKMAGALUR", profile(5.8, 250, 50, 200)),
            ("DHARWAD", profile(7.7, 180, 35, 330)),
            ("MYSORE", profile(6.9, 220, 48, 250)),
            ("RAICHUR", profile(8.5, 130, 20, 430)),
        ],
    ),
    (
        "MAHARASHTRA",
        &[
            ("AHMEDNAGAR", profile(8.2, 145, 22, 400)),
            ("AKOLA", profile(8.1, 155, 25, 380)),
            ("AURANGABAD", profile(8.1, 150, 24, 390)),
            ("JALGAON", profile(8.0, 165, 30, 360)),
            ("KOLHAPUR", profile(7.4, 210, 50, 280)),
            ("NAGPUR", profile(7.5, 180, 45, 320)),
            ("NASHIK", profile(7.9, 170, 38, 340)),
            ("PUNE", profile(7.8, 190, 42, 310)),
            ("RATNAGIRI", profile(5.8, 240, 35, 200)),
            ("SOLAPUR", profile(8.3, 135, 18, 420)),
        ],
    ),
    (
        "PUNJAB",
        &[
            ("AMRITSAR", profile(8.2, 230, 68, 310)),
            ("BATHINDA", profile(8.5, 160, 35, 380)),
            ("FEROZEPUR", profile(8.4, 170, 40, 360)),
            ("HOSHIARPUR", profile(7.6, 240, 55, 280)),
            ("JALANDHAR", profile(8.1, 250, 75, 300)),
            ("LUDHIANA", profile(8.1, 260, 80, 290)),
            ("PATIALA", profile(8.2, 245, 72, 305)),
        ],
    ),
    (
        "TAMIL NADU",
        &[
            ("COIMBATORE", profile(8.1, 180, 40, 360)),
            ("ERODE", profile(8.2, 175, 38, 370)),
            ("MADURAI", profile(7.8, 195, 42, 330)),
            ("NILGIRIS", profile(4.8, 280, 60, 180)),
            ("THANJAVUR", profile(7.3, 230, 55, 250)),
        ],
    ),
    (
        "UTTAR PRADESH",
        &[
            ("AGRA", profile(8.2, 160, 30, 380)),
            ("BAREILLY", profile(7.6, 220, 50, 300)),
            ("GORAKHPUR", profile(7.9, 215, 52, 310)),
            ("LUCKNOW", profile(8.0, 195, 45, 340)),
            ("MEERUT", profile(8.1, 240, 70, 300)),
            ("VARANASI", profile(7.8, 210, 55, 310)),
        ],
    ),
];

/// Embedded soil-health lookup with tiered fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct SoilRegistry;

impl SoilRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a profile and report which tier answered.
    ///
    /// Tier order: exact district match, then the state's district average
    /// (pH to one decimal, NPK as integer means), then the national default.
    pub fn resolve(&self, state: &str, district: &str) -> (SoilProfile, ResolutionTier) {
        let state_upper = state.trim().to_uppercase();
        let district_upper = district.trim().to_uppercase();

        let Some((_, districts)) = SOIL_TABLE.iter().find(|(s, _)| *s == state_upper) else {
            return (NATIONAL_DEFAULT, ResolutionTier::NationalDefault);
        };

        if let Some((_, found)) = districts.iter().find(|(d, _)| *d == district_upper) {
            return (*found, ResolutionTier::District);
        }

        let len = districts.len() as f64;
        let avg = SoilProfile {
            ph: (districts.iter().map(|(_, p)| p.ph).sum::<f64>() / len * 10.0).round() / 10.0,
            n: (districts.iter().map(|(_, p)| p.n).sum::<i32>() as f64 / len) as i32,
            p: (districts.iter().map(|(_, p)| p.p).sum::<i32>() as f64 / len) as i32,
            k: (districts.iter().map(|(_, p)| p.k).sum::<i32>() as f64 / len) as i32,
        };
        (avg, ResolutionTier::StateAverage)
    }
}

#[async_trait]
impl SoilProvider for SoilRegistry {
    async fn soil(&self, state: &str, district: &str) -> Result<SoilProfile> {
        let (profile, tier) = self.resolve(state, district);
        debug!(target: "soil", %state, %district, ?tier, "Resolved soil profile");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_match_is_exact() {
        let registry = SoilRegistry::new();
        let (profile, tier) = registry.resolve("Punjab", "Ludhiana");
        assert_eq!(tier, ResolutionTier::District);
        assert_eq!(
            profile,
            SoilProfile {
                ph: 8.1,
                n: 260,
                p: 80,
                k: 290
            }
        );
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let registry = SoilRegistry::new();
        let (a, _) = registry.resolve("punjab", "  ludhiana ");
        let (b, _) = registry.resolve("PUNJAB", "LUDHIANA");
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_district_falls_back_to_state_average() {
        let registry = SoilRegistry::new();
        let (profile, tier) = registry.resolve("Punjab", "Nowhere");
        assert_eq!(tier, ResolutionTier::StateAverage);

        // Average over the seven Punjab rows
        assert_eq!(profile.ph, 8.2);
        assert_eq!(profile.n, 222);
        assert_eq!(profile.p, 60);
        assert_eq!(profile.k, 317);
    }

    #[test]
    fn unknown_state_falls_back_to_national_default() {
        let registry = SoilRegistry::new();
        let (profile, tier) = registry.resolve("Atlantis", "Nowhere");
        assert_eq!(tier, ResolutionTier::NationalDefault);
        assert_eq!(profile, NATIONAL_DEFAULT);
    }

    #[tokio::test]
    async fn provider_trait_never_errors() {
        let registry = SoilRegistry::new();
        let profile = registry.soil("Atlantis", "Nowhere").await.unwrap();
        assert_eq!(profile.ph, 7.0);
    }
}
