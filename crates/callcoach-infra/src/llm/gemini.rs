//! Gemini backend over the Generative Language `generateContent` API.
//!
//! The API key travels as the `key` query parameter, so request URLs must
//! never be logged.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use callcoach_core::llm::provider::CompletionProvider;
use callcoach_types::llm::{ProviderError, ProviderName};

use super::{ProviderSettings, http_client, send_json};

/// Google Gemini provider. No `Debug` impl.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn text_part(text: &str) -> Vec<Part> {
    vec![Part {
        text: Some(text.to_string()),
    }]
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(ProviderName::Gemini, settings.timeout)?,
            api_key,
            settings,
        })
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: text_part(system_prompt),
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: text_part(user_prompt),
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.settings.max_output_tokens,
                temperature: self.settings.temperature,
            },
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.settings.base_url
        )
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.is_empty())
}

impl CompletionProvider for GeminiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    async fn generate_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        let body = self.request_body(system_prompt, user_prompt);
        let request = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body);

        let response: GenerateResponse = send_json(ProviderName::Gemini, request).await?;
        extract_text(response).ok_or(ProviderError::EmptyResponse {
            provider: ProviderName::Gemini,
        })
    }
}
