//! Per-sender conversation store
//!
//! Each sender identifier owns one [`Conversation`]: the ordered history of
//! exchanges with the model, used as context for the next completion. The
//! store creates conversations lazily and, by default, never forgets them.
//! An [`EvictionPolicy`] can bound memory without touching call sites.

mod eviction;

pub use eviction::EvictionPolicy;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::llm::Message;

/// Shared, lockable conversation owned by one store entry
///
/// The lock is held for the whole gateway call, so requests from the same
/// sender are processed one after another.
pub type ConversationHandle = Arc<Mutex<Conversation>>;

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Accumulated exchange history with the model for one sender
#[derive(Debug, Clone)]
pub struct Conversation {
    sender: String,
    history: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    /// Start an empty conversation for `sender`
    pub fn new(sender: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            sender: sender.into(),
            history: Vec::new(),
            created_at,
        }
    }

    /// Sender identifier this conversation belongs to
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// All turns so far, oldest first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of completed exchanges (user turn + model turn)
    pub fn exchanges(&self) -> usize {
        self.history.len() / 2
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append one completed exchange
    pub fn push_exchange(&mut self, utterance: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Message::user(utterance));
        self.history.push(Message::assistant(reply));
    }
}

struct Entry {
    handle: ConversationHandle,
    last_active: DateTime<Utc>,
}

/// Mapping from sender identifier to conversation handle
pub struct ConversationStore {
    entries: Mutex<HashMap<String, Entry>>,
    policy: EvictionPolicy,
    clock: Clock,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(EvictionPolicy::Unbounded)
    }
}

impl ConversationStore {
    /// Create an empty store using the wall clock
    pub fn new(policy: EvictionPolicy) -> Self {
        Self::with_clock(policy, Arc::new(Utc::now))
    }

    /// Create an empty store with a custom time source
    pub fn with_clock(policy: EvictionPolicy, clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy,
            clock,
        }
    }

    /// Return the sender's conversation, creating an empty one if none exists
    ///
    /// Lookup, eviction and insertion happen under one lock, so concurrent
    /// first requests from the same sender share a single handle.
    pub async fn get_or_create(&self, sender: &str) -> ConversationHandle {
        let now = (self.clock)();
        let mut entries = self.entries.lock().await;

        if let Some(idle) = self.policy.idle_limit() {
            let before = entries.len();
            entries.retain(|_, entry| now - entry.last_active <= idle);
            let evicted = before - entries.len();
            if evicted > 0 {
                debug!(evicted, "evicted idle conversations");
            }
        }

        if let Some(entry) = entries.get_mut(sender) {
            entry.last_active = now;
            return Arc::clone(&entry.handle);
        }

        if let Some(max) = self.policy.max_entries() {
            while entries.len() >= max {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_active)
                    .map(|(key, _)| key.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
                debug!(sender = %oldest, "evicted least recently active conversation");
            }
        }

        let handle = Arc::new(Mutex::new(Conversation::new(sender, now)));
        entries.insert(
            sender.to_string(),
            Entry {
                handle: Arc::clone(&handle),
                last_active: now,
            },
        );
        debug!(sender, total = entries.len(), "started new conversation");

        handle
    }

    /// Number of senders currently tracked
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Whether `sender` currently has a conversation
    pub async fn contains(&self, sender: &str) -> bool {
        self.entries.lock().await.contains_key(sender)
    }
}
