mod common;

use common::{form, state_with, ScriptedGateway, SlowGateway, SENDER, SENDER_FORM};
use gemini_relay::conversation::ConversationStore;
use gemini_relay::handlers::relay;
use gemini_relay::llm::Message;
use gemini_relay::models::InboundMessage;
use gemini_relay::reply::{MAX_REPLY_CHARS, TRUNCATION_SUFFIX, USAGE_HINT};
use gemini_relay::routes::configure_routes;
use gemini_relay::state::AppState;
use gemini_relay::twiml::MessagingResponse;
use std::sync::atomic::Ordering;
use std::time::Duration;
use warp::http::StatusCode;

const EMPTY_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response/>"#;

/// POST a form body to /webhook and return status, content type and body
async fn post_webhook(state: &AppState, body: &str) -> (StatusCode, String, String) {
    let routes = configure_routes(state.clone());
    let response = warp::test::request()
        .method("POST")
        .path("/webhook")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("content-length", body.len().to_string())
        .body(body.to_string())
        .reply(&routes)
        .await;

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let text = String::from_utf8(response.body().to_vec()).expect("body should be UTF-8");
    (response.status(), content_type, text)
}

fn expected(message: &str) -> String {
    MessagingResponse::message(message).to_string()
}

#[tokio::test]
async fn test_message_without_prefix_gets_empty_response() {
    let gateway = ScriptedGateway::new(vec![Ok("unused")]);
    let state = state_with(gateway.clone());

    for body in ["hola", "hola+%21bot", "", "%21BOT+hola"] {
        let (status, content_type, text) = post_webhook(&state, &form(body, SENDER_FORM)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/xml");
        assert_eq!(text, EMPTY_RESPONSE);
        assert!(!text.contains("<Message>"));
    }

    assert_eq!(gateway.call_count(), 0);
    assert!(state.store.is_empty().await);
}

#[tokio::test]
async fn test_prefix_without_question_gets_usage_hint() {
    let gateway = ScriptedGateway::new(vec![]);
    let state = state_with(gateway.clone());

    for body in ["%21bot", "%21bot+++", "++%21bot++"] {
        let (status, _, text) = post_webhook(&state, &form(body, SENDER_FORM)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, expected(USAGE_HINT));
    }

    assert_eq!(gateway.call_count(), 0);
    assert!(state.store.is_empty().await);
}

#[tokio::test]
async fn test_question_from_new_sender_creates_one_conversation() {
    let gateway = ScriptedGateway::new(vec![Ok("4")]);
    let state = state_with(gateway.clone());

    let (status, _, text) = post_webhook(&state, &form("%21bot+2%2B2%3F", SENDER_FORM)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, expected("@bot 4"));
    assert_eq!(state.store.len().await, 1);
    assert!(state.store.contains(SENDER).await);
    assert_eq!(gateway.calls.lock().unwrap()[0], vec![Message::user("2+2?")]);
}

#[tokio::test]
async fn test_history_is_cumulative_per_sender() {
    let gateway = ScriptedGateway::new(vec![Ok("4"), Ok("8"), Ok("hola")]);
    let state = state_with(gateway.clone());

    post_webhook(&state, &form("%21bot+2%2B2%3F", SENDER_FORM)).await;
    post_webhook(&state, &form("%21bot+y+el+doble%3F", SENDER_FORM)).await;
    post_webhook(&state, &form("%21bot+hola", "whatsapp%3A%2B34600999888")).await;

    let calls = gateway.calls.lock().unwrap();
    assert_eq!(
        calls[1],
        vec![
            Message::user("2+2?"),
            Message::assistant("4"),
            Message::user("y el doble?"),
        ]
    );
    // A different sender starts from an empty history
    assert_eq!(calls[2], vec![Message::user("hola")]);
    drop(calls);

    assert_eq!(state.store.len().await, 2);
}

#[tokio::test]
async fn test_gateway_failure_becomes_error_reply() {
    let gateway = ScriptedGateway::new(vec![Err("quota exceeded")]);
    let state = state_with(gateway);

    let (status, _, text) = post_webhook(&state, &form("%21bot+hola", SENDER_FORM)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, expected("@bot ❌ Error: quota exceeded"));

    // The failed exchange is not remembered
    let handle = state.store.get_or_create(SENDER).await;
    assert!(handle.lock().await.history().is_empty());
}

#[tokio::test]
async fn test_long_reply_is_truncated() {
    let long = "x".repeat(3000);
    let gateway = ScriptedGateway::new(vec![Ok(long.as_str())]);
    let state = state_with(gateway);

    let (_, _, text) = post_webhook(&state, &form("%21bot+cuenta", SENDER_FORM)).await;

    let reply = format!("@bot {}", "x".repeat(MAX_REPLY_CHARS - 5));
    assert_eq!(text, expected(&format!("{}{}", reply, TRUNCATION_SUFFIX)));
}

#[tokio::test]
async fn test_reply_markup_is_escaped() {
    let gateway = ScriptedGateway::new(vec![Ok("use <b> & </b>")]);
    let state = state_with(gateway);

    let (_, _, text) = post_webhook(&state, &form("%21bot+html%3F", SENDER_FORM)).await;

    assert!(text.contains("<Message>@bot use &lt;b&gt; &amp; &lt;/b&gt;</Message>"));
}

#[tokio::test]
async fn test_missing_sender_is_still_a_key() {
    let gateway = ScriptedGateway::new(vec![Ok("ok")]);
    let state = state_with(gateway);

    let (_, _, text) = post_webhook(&state, "Body=%21bot+hola").await;

    assert_eq!(text, expected("@bot ok"));
    assert!(state.store.contains("").await);
}

#[tokio::test]
async fn test_non_form_body_is_acknowledged() {
    let gateway = ScriptedGateway::new(vec![]);
    let state = state_with(gateway.clone());
    let routes = configure_routes(state);

    let response = warp::test::request()
        .method("POST")
        .path("/webhook")
        .header("content-type", "application/json")
        .body(r#"{"Body":"!bot hola"}"#)
        .reply(&routes)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), EMPTY_RESPONSE.as_bytes());
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_webhook_requires_post() {
    let routes = configure_routes(state_with(ScriptedGateway::default()));

    let response = warp::test::request()
        .method("GET")
        .path("/webhook")
        .reply(&routes)
        .await;

    assert_ne!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_from_one_sender_are_serialized() {
    let gateway = SlowGateway::new(Duration::from_millis(50));
    let state = AppState::new(ConversationStore::default(), gateway.clone());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                let inbound = InboundMessage::new(format!("!bot pregunta {}", i), SENDER);
                relay(&state, &inbound).await
            })
        })
        .collect();

    for task in tasks {
        let response = task.await.unwrap();
        assert!(response.body().is_some_and(|body| body.starts_with("@bot answer ")));
    }

    assert_eq!(gateway.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(state.store.len().await, 1);

    let handle = state.store.get_or_create(SENDER).await;
    let conversation = handle.lock().await;
    assert_eq!(conversation.exchanges(), 8);
    // Every exchange saw all the earlier ones
    let replies: Vec<_> = conversation
        .history()
        .iter()
        .skip(1)
        .step_by(2)
        .map(|m| m.text.clone())
        .collect();
    let expected: Vec<_> = (1..=8).map(|n| format!("answer {}", n)).collect();
    assert_eq!(replies, expected);
}
