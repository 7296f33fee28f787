//! Mapping between abstraction types and Gemini types

use crate::llm::core::{
    config::GenerationConfig,
    types::{FinishReason, GenerateRequest, Message, MessageRole, StreamEvent, UsageMetadata},
};

use super::types::{
    Content, GeminiGenerationConfig, GenerateContentRequest, GenerateContentResponse, Part,
    SystemInstruction,
};

/// Convert our abstraction request to Gemini's request format
pub fn to_gemini_request(request: GenerateRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: request.messages.into_iter().map(to_gemini_content).collect(),
        system_instruction: request.system.map(|s| SystemInstruction {
            parts: vec![Part::text(s)],
        }),
        generation_config: to_gemini_generation_config(request.config),
    }
}

/// Convert a message to Gemini's content format
fn to_gemini_content(message: Message) -> Content {
    let role = match message.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    };

    Content {
        role: role.to_string(),
        parts: vec![Part::text(message.text)],
    }
}

/// Convert generation config to Gemini's format, omitting it when nothing is set
fn to_gemini_generation_config(config: GenerationConfig) -> Option<GeminiGenerationConfig> {
    if config.is_empty() {
        return None;
    }
    Some(GeminiGenerationConfig {
        max_output_tokens: config.max_tokens,
        temperature: config.temperature,
    })
}

/// Convert one Gemini response chunk to our abstraction's stream events
///
/// Text parts become `TextDelta` events (thinking summaries are skipped). A
/// chunk carrying a finish reason, or a blocked prompt, produces `MessageEnd`.
pub fn from_gemini_response(response: GenerateContentResponse) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    let usage = response
        .usage_metadata
        .as_ref()
        .map(|u| UsageMetadata {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    let Some(candidate) = response.candidates.first() else {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            events.push(StreamEvent::MessageEnd {
                finish_reason: map_finish_reason(&reason),
                usage,
            });
        }
        return events;
    };

    if let Some(content) = &candidate.content {
        for part in &content.parts {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(text) = &part.text {
                events.push(StreamEvent::TextDelta { text: text.clone() });
            }
        }
    }

    if let Some(finish_reason) = &candidate.finish_reason {
        events.push(StreamEvent::MessageEnd {
            finish_reason: map_finish_reason(finish_reason),
            usage,
        });
    }

    events
}

/// Map Gemini's finish reason to our abstraction
fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}
