// src/config.rs
// Process-wide configuration: read once at startup, passed by value into
// the components that need it. Never mutated afterwards.

use tracing::info;

pub const ENV_SERPER_API_KEY: &str = "SERPER_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Serper.dev search credential. Absent keys surface per-request as a
    /// search failure rather than a startup crash.
    pub serper_api_key: Option<String>,
    /// Gemini credential. Absence is a detectable per-request configuration
    /// error (`LlmError::MissingApiKey`).
    pub gemini_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            serper_api_key: read_non_empty(ENV_SERPER_API_KEY),
            gemini_api_key: read_non_empty(ENV_GEMINI_API_KEY),
        }
    }

    /// Safe startup diagnostics: key presence only, never key material.
    pub fn log_startup(&self) {
        info!(
            serper_key = self.serper_api_key.is_some(),
            gemini_key = self.gemini_api_key.is_some(),
            "configuration loaded"
        );
    }
}

fn read_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
