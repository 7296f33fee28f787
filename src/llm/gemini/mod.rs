//! Gemini provider implementation
//!
//! This module provides a client for Google's Gemini models on the
//! Generative Language API, implementing the LlmProvider trait.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

// Re-export main types for convenience
pub use client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
