#![allow(dead_code)]

use async_trait::async_trait;
use gemini_relay::conversation::{Conversation, ConversationStore};
use gemini_relay::gateway::{AiGateway, GatewayError};
use gemini_relay::llm::Message;
use gemini_relay::state::AppState;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sender used when a test does not care which one
pub const SENDER: &str = "whatsapp:+34600111222";

/// Percent-encoded form of [`SENDER`]
pub const SENDER_FORM: &str = "whatsapp%3A%2B34600111222";

/// Gateway answering from a script and recording what it was asked
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    /// History passed in on each call, with the new utterance appended
    pub calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        let replies = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            replies: Arc::new(Mutex::new(replies)),
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AiGateway for ScriptedGateway {
    async fn complete(
        &self,
        conversation: &mut Conversation,
        utterance: &str,
    ) -> Result<String, GatewayError> {
        let mut seen = conversation.history().to_vec();
        seen.push(Message::user(utterance));
        self.calls.lock().unwrap().push(seen);

        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()));

        match next {
            Ok(text) => {
                conversation.push_exchange(utterance, text.clone());
                Ok(text)
            }
            Err(message) => Err(GatewayError::new(message)),
        }
    }
}

/// Gateway that takes `delay` to answer and tracks overlapping calls
#[derive(Clone)]
pub struct SlowGateway {
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    /// Highest number of calls seen running at the same time
    pub max_in_flight: Arc<AtomicUsize>,
}

impl SlowGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }
}

#[async_trait]
impl AiGateway for SlowGateway {
    async fn complete(
        &self,
        conversation: &mut Conversation,
        utterance: &str,
    ) -> Result<String, GatewayError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let reply = format!("answer {}", conversation.exchanges() + 1);
        conversation.push_exchange(utterance, reply.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(reply)
    }
}

/// State with an unbounded store and the given gateway
pub fn state_with(gateway: ScriptedGateway) -> AppState {
    AppState::new(ConversationStore::default(), gateway)
}

/// Build a form-encoded webhook body
pub fn form(body: &str, from: &str) -> String {
    format!("Body={}&From={}", body, from)
}
