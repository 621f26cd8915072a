//! Configuration types for CallCoach.
//!
//! `CoachConfig` represents the `config.toml` in the data directory. Every
//! field has a default so an empty or missing file is valid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::llm::{DEFAULT_MODEL_ID, ProviderName};

/// Top-level CallCoach configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Model id used when a coaching run does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Output token cap sent to providers that accept one.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature for providers that are sent one.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// HTTP timeout for a single provider call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Per-provider overrides, keyed by provider name (`claude`, `gemini`, `openai`).
    #[serde(default)]
    pub providers: HashMap<String, ProviderOverride>,
}

/// Per-provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderOverride {
    /// Replace the provider's public endpoint (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_temperature() -> f64 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl CoachConfig {
    /// Base URL override for a provider, if configured.
    pub fn base_url(&self, provider: ProviderName) -> Option<&str> {
        self.providers
            .get(provider.as_str())
            .and_then(|p| p.base_url.as_deref())
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            providers: HashMap::new(),
        }
    }
}
