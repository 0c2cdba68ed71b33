//! Completion client trait and the OpenAI-compatible implementation.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use stockpilot_core::AiConfig;

use crate::chat::ChatMessage;

/// Completion failure.
///
/// Any of these aborts the calling analysis outright; a degraded or partial
/// answer is never fabricated.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion endpoint is not configured: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("completion API error ({0}): {1}")]
    Api(u16, String),
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// An opaque text-completion function over an ordered conversation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiChatClient {
    config: AiConfig,
    http: reqwest::Client,
}

impl OpenAiChatClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        // Checked per call: a key added to the environment after startup
        // should not require a restart, and a missing key should fail the
        // first analysis, not the process.
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::Config("AI_API_KEY is not set".to_string()))?;

        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
        });

        let resp = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Api(status.as_u16(), body));
        }
        extract_answer(&body)
    }
}

#[derive(Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_answer(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatCompletionBody =
        serde_json::from_str(body).map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| {
            CompletionError::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            )
        })
}
