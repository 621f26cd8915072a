//! Model-id routed access to language-model backends.
//!
//! The gateway owns the only mapping from a model id to a backend: it looks
//! the id up in the static registry (unknown ids fail closed), then reuses or
//! builds the backend instance for that provider name.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use callcoach_types::llm::{ProviderError, ProviderName, provider_for_model};

use super::box_provider::BoxCompletionProvider;
use super::provider::ProviderFactory;

/// Routes completions to the backend registered for a model id.
///
/// Provider instances are built once per provider name and cached, so each
/// backend resolves its credential a single time. Failed constructions are
/// not cached.
pub struct ProviderGateway<F: ProviderFactory> {
    factory: F,
    providers: DashMap<ProviderName, Arc<BoxCompletionProvider>>,
}

impl<F: ProviderFactory> ProviderGateway<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            providers: DashMap::new(),
        }
    }

    fn provider(&self, name: ProviderName) -> Result<Arc<BoxCompletionProvider>, ProviderError> {
        if let Some(existing) = self.providers.get(&name) {
            return Ok(Arc::clone(existing.value()));
        }
        let created = Arc::new(self.factory.create(name)?);
        Ok(Arc::clone(self.providers.entry(name).or_insert(created).value()))
    }

    /// Generate a completion with the backend that serves `model_id`.
    #[tracing::instrument(
        name = "generate_completion",
        skip(self, system_prompt, user_prompt),
        fields(model = %model_id)
    )]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model_id: &str,
    ) -> Result<String, ProviderError> {
        let name = provider_for_model(model_id)?;
        let provider = self.provider(name)?;
        debug!(provider = %name, "dispatching completion");
        let text = provider
            .generate_completion(system_prompt, user_prompt, model_id)
            .await?;
        debug!(provider = %name, chars = text.len(), "completion received");
        Ok(text)
    }
}
