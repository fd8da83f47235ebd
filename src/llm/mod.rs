//! Generative text service backends
//!
//! ## Architecture
//!
//! - **GeminiBackend**: Google Generative Language REST API over `reqwest`
//! - **UnconfiguredBackend**: stands in when no API key is set; every call
//!   fails, so callers take their fallback path

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

mod gemini;

pub use gemini::GeminiBackend;

use crate::config::LlmConfig;

/// Unified trait for generative text backends
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response from the model given a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Backend used when the service is not configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredBackend;

#[async_trait]
impl LlmBackend for UnconfiguredBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("generative text service is not configured")
    }

    fn backend_name(&self) -> &'static str {
        "Unconfigured"
    }
}

/// Factory for creating LLM backends
pub struct LlmFactory;

impl LlmFactory {
    /// Pick a backend for the given config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmBackend>> {
        match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let backend = GeminiBackend::new(&config.endpoint, &config.model, key)?;
                tracing::info!(
                    backend = backend.backend_name(),
                    model = %config.model,
                    "Generative text backend configured"
                );
                Ok(Arc::new(backend))
            }
            None => {
                tracing::warn!(
                    "No generative text API key configured, feedback will use fallback messages"
                );
                Ok(Arc::new(UnconfiguredBackend))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_backend_always_fails() {
        let backend = UnconfiguredBackend;
        assert!(backend.generate("hello").await.is_err());
        assert_eq!(backend.backend_name(), "Unconfigured");
    }

    #[test]
    fn test_factory_without_key_is_unconfigured() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::default()
        };
        let backend = LlmFactory::create(&config).unwrap();
        assert_eq!(backend.backend_name(), "Unconfigured");
    }

    #[test]
    fn test_factory_with_key_is_gemini() {
        let config = LlmConfig {
            api_key: Some("test-key".to_string()),
            ..LlmConfig::default()
        };
        let backend = LlmFactory::create(&config).unwrap();
        assert_eq!(backend.backend_name(), "Gemini");
    }
}
