//! CompletionProvider trait definition.
//!
//! This is the capability every language-model backend implements. Backends
//! differ only in request shaping (auth headers, envelope, response path);
//! none of that is visible through this trait.

use callcoach_types::llm::{ProviderError, ProviderName};

use super::box_provider::BoxCompletionProvider;

/// Trait for language-model backends (Claude, Gemini, OpenAI).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in callcoach-infra.
pub trait CompletionProvider: Send + Sync {
    /// Which registry backend this is.
    fn name(&self) -> ProviderName;

    /// Send one system + user instruction pair and return the raw text reply.
    fn generate_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}

/// Constructs provider instances on demand.
///
/// Construction is where credentials are resolved, so a missing secret
/// surfaces as [`ProviderError::AuthenticationMissing`] before any request
/// is attempted.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, provider: ProviderName) -> Result<BoxCompletionProvider, ProviderError>;
}
