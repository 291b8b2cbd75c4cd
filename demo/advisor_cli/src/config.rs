/// Demo configuration: defaults overridable via environment variables.
#[derive(Debug, Clone)]
pub struct AdvisorCliConfig {
    /// Conversation identifier used for the memory session
    pub session: String,
    /// District or town used for weather, soil and rainfall lookups
    pub location: String,
    /// State the location belongs to
    pub state: String,
}

impl AdvisorCliConfig {
    pub fn load() -> Self {
        Self {
            session: env_or("ADVISOR_SESSION", "cli"),
            location: env_or("ADVISOR_LOCATION", "Ludhiana"),
            state: env_or("ADVISOR_STATE", "Punjab"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
