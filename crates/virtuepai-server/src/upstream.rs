//! Client for the upstream chat-completion API.
//!
//! Sends one non-streaming completion request per attempt: the fixed system
//! prompt plus the user's message. Every attempt is bounded by the configured
//! timeout, and a failed attempt is retried at most once.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{MAX_CHAT_RETRIES, UpstreamConfig};

/// Persona and style instructions sent as the system turn.
pub const SYSTEM_PROMPT: &str = "你是维普特AI客服，一个专业的AI客服助手。你的任务是礼貌地回答用户关于AI客服产品的问题，提供有关价格、功能、集成方式等信息。保持回答简洁、专业且有帮助。如果不确定某个问题的答案，可以引导用户联系我们的销售团队获取更多信息。";

/// Longest upstream error body kept for logging.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Errors from a completion attempt.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),

    /// Connection, TLS, or I/O failure.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// No complete response within the per-attempt timeout.
    #[error("upstream timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The API answered with a non-2xx status.
    #[error("upstream returned {status}")]
    Status { status: u16, body: String },

    /// The body was not the expected JSON.
    #[error("malformed upstream response: {0}")]
    MalformedBody(String),

    /// Valid JSON without `choices[0].message.content`.
    #[error("upstream response has no message content")]
    MissingContent,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatTurn<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
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

/// Chat-completion client. Cheap to share; holds one pooled HTTP client.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl CompletionClient {
    /// Build a client for the given upstream.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Client`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Ask the upstream model to answer `message`.
    ///
    /// Makes one attempt plus up to `max_retries` (never more than one)
    /// further attempts.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn complete(&self, message: &str) -> Result<String, UpstreamError> {
        let attempts = self.config.max_retries.min(MAX_CHAT_RETRIES).saturating_add(1);
        let mut attempt = 1;

        loop {
            match self.attempt(message).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < attempts => {
                    warn!(attempt, error = %e, "upstream completion failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, message: &str) -> Result<String, UpstreamError> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.send(message))
            .await
            .map_err(|_| UpstreamError::Timeout(timeout))?
    }

    async fn send(&self, message: &str) -> Result<String, UpstreamError> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages: [
                ChatTurn {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatTurn {
                    role: "user",
                    content: message,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        debug!(
            model = %self.config.model,
            chars = message.chars().count(),
            "calling upstream completion API"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), body = %body, "upstream returned an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or(UpstreamError::MissingContent)
    }
}
