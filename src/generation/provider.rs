//! Text-generation provider seam and the OpenAI-compatible HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::ProviderConfig;
use crate::error::{Result, ScamguardError};
use crate::retry::{ProviderError, ProviderErrorKind};

/// Trait for text-generation backends.
///
/// Implementations return the raw completion text, which may be empty; the
/// caller decides what an empty completion means.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a conversation of one system and one user message.
    async fn complete(&self, system: &str, user: &str) -> std::result::Result<String, ProviderError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client; the configured timeout bounds every call.
    #[instrument(skip(config), fields(base_url = %config.base_url, model = %config.model))]
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScamguardError::Config(format!("Failed to build HTTP client: {}", e)))?;

        debug!("Created provider client");
        Ok(Self { config, client })
    }

    /// Get the provider configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    #[instrument(skip(self, system, user), fields(model = %self.config.model))]
    async fn complete(&self, system: &str, user: &str) -> std::result::Result<String, ProviderError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::Permanent, "OPENAI_API_KEY is not set")
        })?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Provider request failed");
                transport_error(&e)
            })?;

        let status = response.status();
        if let Some(kind) = ProviderErrorKind::from_status(status.as_u16()) {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Provider returned error status");
            return Err(ProviderError::new(
                kind,
                format!("{} {}", status, summarize(&body)).trim_end().to_string(),
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse provider response");
            transport_error(&e)
        })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

/// Classify a reqwest failure from its flags rather than its text.
fn transport_error(e: &reqwest::Error) -> ProviderError {
    let kind = if e.is_timeout() {
        ProviderErrorKind::Timeout
    } else if e.is_decode() {
        ProviderErrorKind::Permanent
    } else {
        ProviderErrorKind::Network
    };
    ProviderError::new(kind, e.to_string())
}

/// First line of an error body, bounded in length.
fn summarize(body: &str) -> String {
    body.lines().next().unwrap_or("").chars().take(200).collect()
}
