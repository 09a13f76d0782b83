//! OpenAI API Provider
//!
//! Calls the Chat Completions API with the prompt as a single user
//! message. The API key comes from the `OPENAI_API_KEY` environment
//! variable and is held as a `SecretString`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{Completion, TextGenProvider};
use crate::config::LlmConfig;
use crate::constants::network;
use crate::types::{ErrorClassifier, LensError, Result, TokenUsage};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "openai";

/// OpenAI API provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider, reading the key from `OPENAI_API_KEY`
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map(SecretString::from)
            .map_err(|_| {
                LensError::auth(
                    PROVIDER_NAME,
                    "OPENAI_API_KEY not set. Export it to enable insight generation",
                )
            })?;

        Self::with_key(config, api_key)
    }

    pub(crate) fn with_key(config: &LlmConfig, api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                LensError::api(PROVIDER_NAME, format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    /// Point the provider at a different endpoint, for tests and proxies
    pub(crate) fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

#[async_trait]
impl TextGenProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        info!("Generating with OpenAI (model: {})", self.model);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.api_base);
        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(PROVIDER_NAME, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_status(
                PROVIDER_NAME,
                status.as_u16(),
                &body,
            ));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LensError::api(PROVIDER_NAME, format!("unreadable response: {e}")))?;

        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LensError::api(PROVIDER_NAME, "no content in response"))?;

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion { text, usage })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn provider(base: String, model: &str) -> OpenAiProvider {
        let config = LlmConfig {
            provider: "openai".to_string(),
            model: model.to_string(),
            ..LlmConfig::default()
        };
        OpenAiProvider::with_key(&config, SecretString::from("sk-test"))
            .unwrap()
            .with_base_url(base)
    }

    #[tokio::test]
    async fn test_complete_parses_chat_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                  "choices": [{"message": {"role": "assistant", "content": "Revenue held steady."}}],
                  "usage": {"prompt_tokens": 300, "completion_tokens": 50}
                }"#,
            )
            .create_async()
            .await;

        let completion = provider(server.url(), "gpt-4o-mini")
            .complete("prompt")
            .await
            .unwrap();

        assert_eq!(completion.text, "Revenue held steady.");
        assert_eq!(completion.usage.total(), 350);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_content_is_api_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
            .create_async()
            .await;

        let err = provider(server.url(), "gpt-4o-mini")
            .complete("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::Api { .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = provider(server.url(), "gpt-4o-mini")
            .complete("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::Auth { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LlmConfig::default();
        let provider =
            OpenAiProvider::with_key(&config, SecretString::from("sk-secret-value")).unwrap();
        let debug = format!("{provider:?}");

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret-value"));
    }
}
