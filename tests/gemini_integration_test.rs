//! Integration tests for the Gemini client
//!
//! These tests make real API calls and need a Generative Language API key.
//! To run them:
//! 1. Put `GEMINI_API_KEY=...` in `.env` or the environment
//! 2. Run: `cargo test --test gemini_integration_test -- --ignored`

use chrono::Utc;
use futures::StreamExt;
use gemini_relay::conversation::Conversation;
use gemini_relay::gateway::{AiGateway, LlmGateway};
use gemini_relay::llm::{
    gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL},
    GenerateRequest, GenerationConfig, LlmError, LlmProvider, Message, StreamEvent,
};
use std::env;

/// Helper to create a test client
fn create_test_client() -> GeminiClient {
    dotenvy::dotenv().ok();

    let api_key = env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY required");
    let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    GeminiClient::new(api_key, model, DEFAULT_BASE_URL).expect("Failed to create Gemini client")
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_gemini_simple_generation() {
    let client = create_test_client();

    let request = GenerateRequest {
        messages: vec![Message::user("What is 2+2? Answer with just the number.")],
        config: GenerationConfig::default(),
        system: None,
    };

    let mut stream = client
        .stream_generate(request)
        .await
        .expect("Failed to start stream");

    let mut text = String::new();
    let mut finished = false;

    while let Some(event) = stream.next().await {
        match event.expect("Stream error") {
            StreamEvent::TextDelta { text: t } => text.push_str(&t),
            StreamEvent::MessageEnd { .. } => finished = true,
            StreamEvent::MessageStart { .. } => {}
        }
    }

    println!("Response: {}", text);

    assert!(finished);
    assert!(text.contains('4'));
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_gateway_keeps_context() {
    let gateway = LlmGateway::new(create_test_client());
    let mut conversation = Conversation::new("integration-test", Utc::now());

    gateway
        .complete(&mut conversation, "My favourite number is 42. Just say OK.")
        .await
        .expect("First completion failed");
    let reply = gateway
        .complete(&mut conversation, "What is my favourite number? Answer with just the number.")
        .await
        .expect("Second completion failed");

    println!("Response: {}", reply);

    assert!(reply.contains("42"));
    assert_eq!(conversation.exchanges(), 2);
}

#[tokio::test]
#[ignore] // Makes a network call, but needs no valid key
async fn test_invalid_api_key_is_a_provider_error() {
    let client = GeminiClient::new("not-a-real-key", DEFAULT_MODEL, DEFAULT_BASE_URL)
        .expect("Failed to create Gemini client");

    let request = GenerateRequest {
        messages: vec![Message::user("Hello")],
        config: GenerationConfig::default(),
        system: None,
    };

    match client.stream_generate(request).await {
        Err(LlmError::ProviderError { code, .. }) => assert!(!code.is_empty()),
        Err(other) => panic!("Expected provider error, got {:?}", other),
        Ok(_) => panic!("Expected the request to be rejected"),
    }
}
