//! LLM Abstraction Layer
//!
//! Provider-neutral request and message types plus the Google Gemini
//! provider used to answer relayed chat messages.

pub mod core;
pub mod gemini;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{FinishReason, GenerateRequest, Message, MessageRole, StreamEvent, UsageMetadata},
};

pub use gemini::GeminiClient;
