//! OpenAI backend over the Chat Completions API.
//!
//! The o1 family rejects a system-role message and the `max_tokens`
//! parameter. For those models the system prompt is folded into the single
//! user message and no token cap is sent.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use callcoach_core::llm::provider::CompletionProvider;
use callcoach_types::llm::{ProviderError, ProviderName};

use super::{ChatMessage, ProviderSettings, http_client, send_json};

/// OpenAI provider. No `Debug` impl; the key stays inside [`SecretString`].
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Models that take no system role and no `max_tokens`.
pub fn folds_system_prompt(model: &str) -> bool {
    model.starts_with("o1")
}

impl OpenAiProvider {
    pub fn new(api_key: SecretString, settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(ProviderName::OpenAi, settings.timeout)?,
            api_key,
            settings,
        })
    }

    fn request_body<'a>(&self, system_prompt: &str, user_prompt: &str, model: &'a str) -> ChatRequest<'a> {
        if folds_system_prompt(model) {
            return ChatRequest {
                model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: format!("{system_prompt}\n\n{user_prompt}"),
                }],
                max_tokens: None,
            };
        }
        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: Some(self.settings.max_output_tokens),
        }
    }
}

fn extract_text(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()?
        .message?
        .content
        .filter(|t| !t.is_empty())
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::OpenAi
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
            .post(format!("{}/v1/chat/completions", self.settings.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body);

        let response: ChatResponse = send_json(ProviderName::OpenAi, request).await?;
        extract_text(response).ok_or(ProviderError::EmptyResponse {
            provider: ProviderName::OpenAi,
        })
    }
}
