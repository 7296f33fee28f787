// Shared state handed to every request

use std::sync::Arc;

use crate::conversation::ConversationStore;
use crate::gateway::AiGateway;

/// Process-wide state shared by all requests
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub gateway: Arc<dyn AiGateway>,
}

impl AppState {
    pub fn new(store: ConversationStore, gateway: impl AiGateway + 'static) -> Self {
        Self {
            store: Arc::new(store),
            gateway: Arc::new(gateway),
        }
    }
}
