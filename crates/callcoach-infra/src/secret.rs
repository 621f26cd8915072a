//! Environment variable credential lookup.
//!
//! Each provider reads one variable. Values are wrapped in [`SecretString`]
//! as soon as they are read and are never logged.

use secrecy::SecretString;

use callcoach_types::llm::{ProviderError, ProviderName};

/// Environment variable holding the API key for `provider`.
pub fn api_key_env_var(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::Claude => "CLAUDE_API_KEY",
        ProviderName::Gemini => "GEMINI_API_KEY",
        ProviderName::OpenAi => "COACH_OPENAI_API_KEY",
    }
}

/// Resolves provider API keys from the process environment.
///
/// Lookup goes through a closure so tests can supply a fixed map instead of
/// mutating the real environment.
pub struct EnvSecretProvider {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// The API key for `provider`.
    ///
    /// A missing, empty or non-Unicode variable is
    /// [`ProviderError::AuthenticationMissing`].
    pub fn api_key(&self, provider: ProviderName) -> Result<SecretString, ProviderError> {
        let env_var = api_key_env_var(provider);
        match (self.lookup)(env_var) {
            Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
            _ => Err(ProviderError::AuthenticationMissing {
                provider,
                env_var: env_var.to_string(),
            }),
        }
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}
