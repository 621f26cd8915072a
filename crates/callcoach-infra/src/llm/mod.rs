//! Language-model provider implementations.
//!
//! Contains the concrete [`CompletionProvider`] backends defined in
//! `callcoach-core` and [`EnvProviderFactory`], which builds them with keys
//! from the environment and settings from `config.toml`.
//!
//! [`CompletionProvider`]: callcoach_core::llm::provider::CompletionProvider

pub mod claude;
pub mod gemini;
pub mod openai;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use callcoach_core::llm::box_provider::BoxCompletionProvider;
use callcoach_core::llm::provider::ProviderFactory;
use callcoach_types::config::CoachConfig;
use callcoach_types::llm::{ProviderError, ProviderName};

use crate::secret::EnvSecretProvider;

use self::claude::ClaudeProvider;
use self::gemini::GeminiProvider;
use self::openai::OpenAiProvider;

/// Public endpoint for each backend.
pub fn default_base_url(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::Claude => "https://api.anthropic.com",
        ProviderName::Gemini => "https://generativelanguage.googleapis.com",
        ProviderName::OpenAi => "https://api.openai.com",
    }
}

/// Request settings shared by every backend.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn from_config(config: &CoachConfig, provider: ProviderName) -> Self {
        Self {
            base_url: config
                .base_url(provider)
                .unwrap_or(default_base_url(provider))
                .trim_end_matches('/')
                .to_string(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn defaults(provider: ProviderName) -> Self {
        Self::from_config(&CoachConfig::default(), provider)
    }
}

/// A single chat turn, shared by the Claude and OpenAI envelopes.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

pub(crate) fn http_client(
    provider: ProviderName,
    timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport {
            provider,
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Send a prepared request and decode a JSON success body.
///
/// Non-success statuses become [`ProviderError::UpstreamRejected`] carrying
/// the status and body text. URLs are stripped from transport errors since
/// some backends carry the key in the query string.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderName,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::Transport {
        provider,
        message: format!("HTTP request failed: {}", e.without_url()),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider = %provider, status = status.as_u16(), "provider rejected request");
        return Err(ProviderError::UpstreamRejected {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| ProviderError::Transport {
        provider,
        message: format!("failed to parse response: {}", e.without_url()),
    })
}

/// Builds providers with API keys from the environment.
///
/// A missing key fails construction with
/// [`ProviderError::AuthenticationMissing`], before any request is made.
pub struct EnvProviderFactory {
    secrets: EnvSecretProvider,
    config: CoachConfig,
}

impl EnvProviderFactory {
    pub fn new(config: CoachConfig) -> Self {
        Self::with_secrets(EnvSecretProvider::new(), config)
    }

    pub fn with_secrets(secrets: EnvSecretProvider, config: CoachConfig) -> Self {
        Self { secrets, config }
    }
}

impl ProviderFactory for EnvProviderFactory {
    fn create(&self, provider: ProviderName) -> Result<BoxCompletionProvider, ProviderError> {
        let api_key = self.secrets.api_key(provider)?;
        let settings = ProviderSettings::from_config(&self.config, provider);
        tracing::debug!(provider = %provider, base_url = %settings.base_url, "creating provider");

        Ok(match provider {
            ProviderName::Claude => BoxCompletionProvider::new(ClaudeProvider::new(api_key, settings)?),
            ProviderName::Gemini => BoxCompletionProvider::new(GeminiProvider::new(api_key, settings)?),
            ProviderName::OpenAi => BoxCompletionProvider::new(OpenAiProvider::new(api_key, settings)?),
        })
    }
}
