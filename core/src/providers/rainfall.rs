//! Annual rainfall normals by district.
//!
//! Same tiered resolution as the soil registry: district normal, state mean,
//! national default.

use super::ResolutionTier;
use crate::Result;
use async_trait::async_trait;
use tracing::debug;

/// National average annual rainfall, mm
const NATIONAL_DEFAULT_MM: f64 = 1000.0;

static RAINFALL_TABLE: &[(&str, &[(&str, f64)])] = &[
    (
        "HARYANA",
        &[
            ("AMBALA", 1012.3),
            ("BHIWANI", 428.3),
            ("HISAR", 429.4),
            ("KARNAL", 744.9),
            ("KURUKSHETRA", 792.6),
            ("ROHTAK", 505.9),
            ("SIRSA", 321.4),
        ],
    ),
    (
        "KARNATAKA",
        &[
            ("BAGALKOT", 562.7),
            ("BELGAUM", 808.1),
            ("BELLARY", 577.3),
            ("CHIKMAGALUR", 1925.2),
            ("DHARWAD", 772.3),
            ("MYSORE", 798.2),
            ("RAICHUR", 621.4),
        ],
    ),
    (
        "MAHARASHTRA",
        &[
            ("AHMEDNAGAR", 501.4),
            ("AKOLA", 798.6),
            ("AURANGABAD", 725.8),
            ("JALGAON", 690.2),
            ("KOLHAPUR", 1832.5),
            ("NAGPUR", 1062.3),
            ("NASHIK", 1037.4),
            ("PUNE", 741.1),
            ("RATNAGIRI", 3226.7),
            ("SOLAPUR", 545.4),
        ],
    ),
    (
        "PUNJAB",
        &[
            ("AMRITSAR", 680.9),
            ("BATHINDA", 423.4),
            ("FEROZEPUR", 398.6),
            ("HOSHIARPUR", 1059.4),
            ("JALANDHAR", 703.6),
            ("LUDHIANA", 680.2),
            ("PATIALA", 741.3),
        ],
    ),
    (
        "TAMIL NADU",
        &[
            ("COIMBATORE", 693.2),
            ("ERODE", 689.4),
            ("MADURAI", 857.6),
            ("NILGIRIS", 1920.8),
            ("THANJAVUR", 941.2),
        ],
    ),
    (
        "UTTAR PRADESH",
        &[
            ("AGRA", 687.3),
            ("BAREILLY", 1031.2),
            ("GORAKHPUR", 1221.1),
            ("LUCKNOW", 959.4),
            ("MEERUT", 834.9),
            ("VARANASI", 1018.2),
        ],
    ),
];

/// Annual rainfall collaborator
#[async_trait]
pub trait RainfallProvider: Send + Sync {
    async fn annual_rainfall(&self, state: &str, district: &str) -> Result<f64>;
}

/// Embedded rainfall-normals lookup with tiered fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct RainfallNormals;

impl RainfallNormals {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, state: &str, district: &str) -> (f64, ResolutionTier) {
        let state_upper = state.trim().to_uppercase();
        let district_upper = district.trim().to_uppercase();

        let Some((_, districts)) = RAINFALL_TABLE.iter().find(|(s, _)| *s == state_upper) else {
            return (NATIONAL_DEFAULT_MM, ResolutionTier::NationalDefault);
        };

        if let Some((_, mm)) = districts.iter().find(|(d, _)| *d == district_upper) {
            return (*mm, ResolutionTier::District);
        }

        let mean = districts.iter().map(|(_, mm)| mm).sum::<f64>() / districts.len() as f64;
        (mean, ResolutionTier::StateAverage)
    }
}

#[async_trait]
impl RainfallProvider for RainfallNormals {
    async fn annual_rainfall(&self, state: &str, district: &str) -> Result<f64> {
        let (mm, tier) = self.resolve(state, district);
        debug!(target: "rainfall", %state, %district, ?tier, mm, "Resolved annual rainfall");
        Ok(mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_normal_wins() {
        let normals = RainfallNormals::new();
        let (mm, tier) = normals.resolve("Punjab", "Ludhiana");
        assert_eq!(tier, ResolutionTier::District);
        assert_eq!(mm, 680.2);
    }

    #[test]
    fn unknown_district_uses_state_mean() {
        let normals = RainfallNormals::new();
        let (mm, tier) = normals.resolve("Punjab", "Nowhere");
        assert_eq!(tier, ResolutionTier::StateAverage);

        let expected = (680.9 + 423.4 + 398.6 + 1059.4 + 703.6 + 680.2 + 741.3) / 7.0;
        assert!((mm - expected).abs() < 1e-9);
    }

    #[test]
    fn unknown_state_uses_national_default() {
        let normals = RainfallNormals::new();
        let (mm, tier) = normals.resolve("Atlantis", "Nowhere");
        assert_eq!(tier, ResolutionTier::NationalDefault);
        assert_eq!(mm, NATIONAL_DEFAULT_MM);
    }
}
