//! Language-model provider names, the static model registry, and provider errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named language-model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Claude,
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Claude => "claude",
            ProviderName::Gemini => "gemini",
            ProviderName::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(ProviderName::Claude),
            "gemini" => Ok(ProviderName::Gemini),
            "openai" => Ok(ProviderName::OpenAi),
            other => Err(format!("invalid provider name: '{other}'")),
        }
    }
}

/// One row of the model registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelConfig {
    pub id: &'static str,
    pub provider: ProviderName,
    pub display_name: &'static str,
}

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL_ID: &str = "claude-sonnet-4-20250514";

/// Every model a coaching run may be routed to.
pub const AVAILABLE_MODELS: &[ModelConfig] = &[
    ModelConfig {
        id: "claude-sonnet-4-20250514",
        provider: ProviderName::Claude,
        display_name: "Claude Sonnet 4",
    },
    ModelConfig {
        id: "claude-opus-4-20250514",
        provider: ProviderName::Claude,
        display_name: "Claude Opus 4",
    },
    ModelConfig {
        id: "claude-haiku-3-5-latest",
        provider: ProviderName::Claude,
        display_name: "Claude Haiku 3.5",
    },
    ModelConfig {
        id: "gemini-2.0-flash",
        provider: ProviderName::Gemini,
        display_name: "Gemini 2.0 Flash",
    },
    ModelConfig {
        id: "gemini-2.0-pro-exp-02-05",
        provider: ProviderName::Gemini,
        display_name: "Gemini 2.0 Pro",
    },
    ModelConfig {
        id: "gemini-1.5-pro",
        provider: ProviderName::Gemini,
        display_name: "Gemini 1.5 Pro",
    },
    ModelConfig {
        id: "gpt-4o",
        provider: ProviderName::OpenAi,
        display_name: "GPT-4o",
    },
    ModelConfig {
        id: "gpt-4o-mini",
        provider: ProviderName::OpenAi,
        display_name: "GPT-4o Mini",
    },
    ModelConfig {
        id: "o1",
        provider: ProviderName::OpenAi,
        display_name: "o1",
    },
];

/// Every model the gateway can route to, in display order.
pub fn available_models() -> &'static [ModelConfig] {
    AVAILABLE_MODELS
}

/// Look up a model by exact id.
pub fn find_model(model_id: &str) -> Option<&'static ModelConfig> {
    AVAILABLE_MODELS.iter().find(|m| m.id == model_id)
}

/// Resolve the backend for a model id. Unknown ids are an error, never a guess.
pub fn provider_for_model(model_id: &str) -> Result<ProviderName, ProviderError> {
    find_model(model_id)
        .map(|m| m.provider)
        .ok_or_else(|| ProviderError::UnknownModel(model_id.to_string()))
}

/// Errors from language-model provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider}: credential {env_var} is not set")]
    AuthenticationMissing {
        provider: ProviderName,
        env_var: String,
    },

    #[error("{provider} API error {status}: {body}")]
    UpstreamRejected {
        provider: ProviderName,
        status: u16,
        body: String,
    },

    #[error("no response content from {provider}")]
    EmptyResponse { provider: ProviderName },

    #[error("{provider} request failed: {message}")]
    Transport {
        provider: ProviderName,
        message: String,
    },

    #[error("unknown model: {0}")]
    UnknownModel(String),
}
