//! Chat proxy: forward to the upstream model, fall back to canned replies.
//!
//! Every call ends in one of two states. `Succeeded` carries the model's text
//! verbatim. `FallenBack` carries the keyword-matched canned reply for the
//! original message. Either way the caller gets a displayable string, and the
//! `success` flag tells it which one it got.

use serde::Serialize;
use tracing::{info, warn};

use virtuepai_core::fallback::{self, Topic};

use crate::upstream::{CompletionClient, UpstreamError};

/// User-facing note attached to fallback replies.
pub const FALLBACK_NOTICE: &str = "智能客服暂时繁忙，以下为预设回复";

/// Reply returned to the chat UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal state of one proxied request.
#[derive(Debug)]
pub enum ProxyOutcome {
    Succeeded(String),
    FallenBack {
        topic: Topic,
        cause: UpstreamError,
    },
}

impl ProxyOutcome {
    /// Convert into the UI reply. The upstream error is never exposed.
    #[must_use]
    pub fn into_reply(self) -> ChatReply {
        match self {
            Self::Succeeded(reply) => ChatReply {
                success: true,
                reply,
                error: None,
            },
            Self::FallenBack { topic, .. } => ChatReply {
                success: false,
                reply: topic.canned_reply().to_owned(),
                error: Some(FALLBACK_NOTICE.to_owned()),
            },
        }
    }
}

/// Stateless chat proxy over a [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct ChatProxy {
    upstream: CompletionClient,
}

impl ChatProxy {
    #[must_use]
    pub fn new(upstream: CompletionClient) -> Self {
        Self { upstream }
    }

    /// Forward `message` and settle on a final outcome.
    pub async fn forward(&self, message: &str) -> ProxyOutcome {
        match self.upstream.complete(message).await {
            Ok(content) => {
                info!(chars = content.chars().count(), "chat answered by upstream model");
                ProxyOutcome::Succeeded(content)
            }
            Err(cause) => {
                let topic = fallback::classify(message);
                warn!(error = %cause, topic = ?topic, "upstream unavailable, using fallback reply");
                ProxyOutcome::FallenBack { topic, cause }
            }
        }
    }

    /// Answer `message`. Never fails.
    pub async fn handle_chat(&self, message: &str) -> ChatReply {
        self.forward(message).await.into_reply()
    }
}
