//! AI gateway: one completion per relayed question
//!
//! The gateway sends a conversation's history plus the new utterance to the
//! model and, on success, records the exchange in the conversation.

use async_trait::async_trait;
use futures::StreamExt;
use thiserror::Error;
use tracing::debug;

use crate::conversation::Conversation;
use crate::llm::{
    FinishReason, GenerateRequest, GenerationConfig, LlmError, LlmProvider, Message, StreamEvent,
};

/// A failed completion, reduced to the text shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<LlmError> for GatewayError {
    fn from(err: LlmError) -> Self {
        GatewayError::new(err.to_string())
    }
}

/// Completion service used by the webhook handler
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Answer `utterance` in the context of `conversation`
    ///
    /// On success the exchange is appended to the conversation. On failure the
    /// conversation is left unchanged. A single attempt is made per call.
    async fn complete(
        &self,
        conversation: &mut Conversation,
        utterance: &str,
    ) -> Result<String, GatewayError>;
}

/// Gateway backed by a streaming [`LlmProvider`]
pub struct LlmGateway<P> {
    provider: P,
    config: GenerationConfig,
    system: Option<String>,
}

impl<P: LlmProvider> LlmGateway<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: GenerationConfig::default(),
            system: None,
        }
    }

    /// Set the generation parameters sent with every request
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the system instruction sent with every request
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    /// Run one completion and collect its text
    async fn generate(&self, history: &[Message], utterance: &str) -> Result<String, LlmError> {
        let mut messages = history.to_vec();
        messages.push(Message::user(utterance));

        let request = GenerateRequest {
            messages,
            config: self.config.clone(),
            system: self.system.clone(),
        };

        let mut stream = self.provider.stream_generate(request).await?;

        let mut text = String::new();
        let mut finish = None;
        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::MessageStart { .. } => {}
                StreamEvent::TextDelta { text: delta } => text.push_str(&delta),
                StreamEvent::MessageEnd {
                    finish_reason,
                    usage,
                } => {
                    debug!(
                        ?finish_reason,
                        total_tokens = usage.total_tokens,
                        "completion finished"
                    );
                    finish = Some(finish_reason);
                    break;
                }
            }
        }

        if text.is_empty() {
            let reason = match finish {
                Some(FinishReason::Safety) => "blocked by safety filters".to_string(),
                Some(FinishReason::MaxTokens) => "output token limit reached".to_string(),
                Some(FinishReason::Other(reason)) => format!("finished with reason {}", reason),
                Some(FinishReason::Stop) | None => "the model returned no text".to_string(),
            };
            return Err(LlmError::EmptyResponse(reason));
        }

        Ok(text)
    }
}

#[async_trait]
impl<P: LlmProvider> AiGateway for LlmGateway<P> {
    async fn complete(
        &self,
        conversation: &mut Conversation,
        utterance: &str,
    ) -> Result<String, GatewayError> {
        let reply = self.generate(conversation.history(), utterance).await?;
        conversation.push_exchange(utterance, reply.clone());
        Ok(reply)
    }
}
