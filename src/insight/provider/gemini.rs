//! Gemini API Provider
//!
//! Calls the `generateContent` endpoint of the Gemini API. The API key
//! comes from the `GEMINI_API_KEY` environment variable and is held as a
//! `SecretString`. A missing key surfaces as an auth error, which keeps
//! it scoped to the narrative panel rather than failing the whole run.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{Completion, TextGenProvider};
use crate::config::LlmConfig;
use crate::constants::network;
use crate::types::{ErrorClassifier, LensError, Result, TokenUsage};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const PROVIDER_NAME: &str = "gemini";

/// Gemini API provider with secure API key handling
pub struct GeminiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider, reading the key from `GEMINI_API_KEY`
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map(SecretString::from)
            .map_err(|_| {
                LensError::auth(
                    PROVIDER_NAME,
                    "GEMINI_API_KEY not set. Export it to enable insight generation",
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
impl TextGenProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        info!("Generating with Gemini (model: {})", self.model);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LensError::api(PROVIDER_NAME, format!("unreadable response: {e}")))?;

        let text = body
            .candidates
            .as_deref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.as_deref())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LensError::api(PROVIDER_NAME, "no text in response"))?;

        let usage = body
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
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
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn provider(base: String) -> GeminiProvider {
        let config = LlmConfig::default();
        GeminiProvider::with_key(&config, SecretString::from("test-key"))
            .unwrap()
            .with_base_url(base)
    }

    #[tokio::test]
    async fn test_complete_parses_text_and_usage() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r###"{
                  "candidates": [{"content": {"parts": [{"text": "## Summary\n"}, {"text": "Revenue grew."}]}}],
                  "usageMetadata": {"promptTokenCount": 420, "candidatesTokenCount": 96}
                }"###,
            )
            .create_async()
            .await;

        let completion = provider(server.url()).complete("prompt").await.unwrap();

        assert_eq!(completion.text, "## Summary\nRevenue grew.");
        assert_eq!(completion.usage.prompt_tokens, 420);
        assert_eq!(completion.usage.completion_tokens, 96);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(403)
            .with_body(r#"{"error": {"message": "API key not valid"}}"#)
            .create_async()
            .await;

        let err = provider(server.url()).complete("prompt").await.unwrap_err();
        assert!(matches!(err, LensError::Auth { .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_delay() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(429)
            .with_body(r#"{"error": {"details": [{"retryDelay": "14s"}]}}"#)
            .create_async()
            .await;

        let err = provider(server.url()).complete("prompt").await.unwrap_err();
        match err {
            LensError::RateLimit { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(14)));
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = provider(server.url()).complete("prompt").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_network() {
        // Port 1 on loopback refuses immediately
        let err = provider("http://127.0.0.1:1".to_string())
            .complete("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::Network { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_candidates_is_api_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let err = provider(server.url()).complete("prompt").await.unwrap_err();
        assert!(matches!(err, LensError::Api { .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LlmConfig::default();
        let provider =
            GeminiProvider::with_key(&config, SecretString::from("super-secret")).unwrap();
        let debug = format!("{provider:?}");

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_temperature_serialized_only_when_set() {
        let request = GenerateRequest {
            contents: vec![],
            generation_config: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());

        let request = GenerateRequest {
            contents: vec![],
            generation_config: Some(GenerationConfig { temperature: 0.5 }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }
}
