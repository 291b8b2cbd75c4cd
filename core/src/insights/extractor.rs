use serde::de::DeserializeOwned;
use tracing::warn;

/// Which path produced the insight list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    /// Parsed and validated from the model's output
    Live,
    /// Static hand-authored content substituted after a parse failure
    Fallback,
}

/// Discriminated extraction result, so callers can tell live data from
/// fallback content
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub source: InsightSource,
}

impl<T> Extraction<T> {
    pub fn used_fallback(&self) -> bool {
        self.source == InsightSource::Fallback
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Remove an optional markdown code fence around the payload.
///
/// Models are instructed to return a raw JSON array but sometimes wrap it
/// in ```json ... ``` anyway.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parse a JSON array of insights out of raw completion text.
///
/// Truncates to `expected_count`; when the model returned fewer items the
/// parsed items are kept as-is (never padded). Any parse or shape failure
/// yields the provided fallback; formatting drift from the model must not
/// block the caller.
pub fn extract<T: DeserializeOwned>(
    raw: &str,
    expected_count: usize,
    fallback: Vec<T>,
) -> Extraction<T> {
    let cleaned = strip_code_fence(raw);
    match serde_json::from_str::<Vec<T>>(cleaned) {
        Ok(mut items) => {
            items.truncate(expected_count);
            Extraction {
                items,
                source: InsightSource::Live,
            }
        }
        Err(e) => {
            warn!(target: "insights", error = %e, "Failed to parse insight JSON, using fallback");
            Extraction {
                items: fallback,
                source: InsightSource::Fallback,
            }
        }
    }
}
