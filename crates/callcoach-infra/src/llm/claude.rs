//! Claude backend over the Anthropic Messages API (`/v1/messages`).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use callcoach_core::llm::provider::CompletionProvider;
use callcoach_types::llm::{ProviderError, ProviderName};

use super::{ChatMessage, ProviderSettings, http_client, send_json};

/// Anthropic Claude provider.
///
/// The API key is a [`SecretString`], exposed only when building the request
/// headers. No `Debug` impl.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: SecretString,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ClaudeProvider {
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString, settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(ProviderName::Claude, settings.timeout)?,
            api_key,
            settings,
        })
    }

    fn request_body<'a>(&self, system_prompt: &'a str, user_prompt: &str, model: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model,
            max_tokens: self.settings.max_output_tokens,
            system: system_prompt,
            messages: vec![ChatMessage {
                role: "user",
                content: user_prompt.to_string(),
            }],
        }
    }
}

/// Text of the first content block, when it is a non-empty text block.
fn extract_text(response: MessagesResponse) -> Option<String> {
    let first = response.content.into_iter().next()?;
    if first.kind != "text" {
        return None;
    }
    first.text.filter(|t| !t.is_empty())
}

impl CompletionProvider for ClaudeProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Claude
    }

    async fn generate_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        let body = self.request_body(system_prompt, user_prompt, model);
        let request = self
            .client
            .post(format!("{}/v1/messages", self.settings.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let response: MessagesResponse = send_json(ProviderName::Claude, request).await?;
        extract_text(response).ok_or(ProviderError::EmptyResponse {
            provider: ProviderName::Claude,
        })
    }
}
