//! Language-model provider abstractions.
//!
//! - `CompletionProvider`: RPITIT trait for concrete backends
//! - `BoxCompletionProvider`: object-safe wrapper for dynamic dispatch
//! - `ProviderGateway`: routes a model id to its backend through the model registry

pub mod box_provider;
pub mod gateway;
pub mod provider;
