//! Text-Generation Provider Abstraction
//!
//! Defines the [`TextGenProvider`] trait for narrative generation. All
//! providers return a [`Completion`] with token usage, and all hold their
//! API key as a [`secrecy::SecretString`] read from the environment. Keys
//! never appear in configuration, logs or serialized output.

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{LensError, Result, TokenUsage};

/// A generated narrative with the service's token accounting
#[derive(Debug, Clone)]
pub struct Completion {
    /// Markdown text returned by the service
    pub text: String,
    /// Token usage, zeroed when the service omits it
    pub usage: TokenUsage,
}

/// Shared provider handle for use across async tasks
pub type SharedProvider = Arc<dyn TextGenProvider + Send + Sync>;

/// Text-generation provider for insight narratives
#[async_trait]
pub trait TextGenProvider: Send + Sync {
    /// Generate a completion for a prompt.
    ///
    /// Implementations classify failures into the insight-service error
    /// variants so the composer can make retry decisions.
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        other => Err(LensError::Config(format!(
            "Unknown provider: {other}. Supported: gemini, openai"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_rejects_unknown() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            ..LlmConfig::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown provider"));
    }
}
