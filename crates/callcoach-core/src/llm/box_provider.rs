//! BoxCompletionProvider -- object-safe dynamic dispatch wrapper for CompletionProvider.
//!
//! 1. Define an object-safe `CompletionProviderDyn` trait with boxed futures
//! 2. Blanket-impl `CompletionProviderDyn` for all `T: CompletionProvider`
//! 3. `BoxCompletionProvider` wraps `Box<dyn CompletionProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use callcoach_types::llm::{ProviderError, ProviderName};

use super::provider::CompletionProvider;

/// Object-safe version of [`CompletionProvider`] with boxed futures.
pub trait CompletionProviderDyn: Send + Sync {
    fn name(&self) -> ProviderName;

    fn generate_completion_boxed<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

impl<T: CompletionProvider> CompletionProviderDyn for T {
    fn name(&self) -> ProviderName {
        CompletionProvider::name(self)
    }

    fn generate_completion_boxed<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.generate_completion(system_prompt, user_prompt, model))
    }
}

/// Type-erased provider for runtime backend selection.
///
/// `CompletionProvider` uses RPITIT and cannot be a trait object directly;
/// this wrapper provides the same method over a boxed `CompletionProviderDyn`.
pub struct BoxCompletionProvider {
    inner: Box<dyn CompletionProviderDyn + Send + Sync>,
}

impl BoxCompletionProvider {
    /// Wrap a concrete `CompletionProvider` in a type-erased box.
    pub fn new<T: CompletionProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> ProviderName {
        self.inner.name()
    }

    /// Send one system + user instruction pair and return the raw text reply.
    pub async fn generate_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        self.inner
            .generate_completion_boxed(system_prompt, user_prompt, model)
            .await
    }
}
