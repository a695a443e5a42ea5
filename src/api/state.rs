// src/api/state.rs

use std::sync::Arc;

use crate::chat::ChatService;
use crate::llm::ModelProvider;
use crate::persistence::MessageLog;

/// Shared, read-only server state. Cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider credential was configured at startup
    pub provider: Option<Arc<dyn ModelProvider>>,
    pub chat: Arc<ChatService>,
    pub message_log: Option<Arc<dyn MessageLog>>,
}

impl AppState {
    pub fn new(provider: Option<Arc<dyn ModelProvider>>, chat: ChatService) -> Self {
        Self {
            provider,
            chat: Arc::new(chat),
            message_log: None,
        }
    }

    pub fn with_message_log(mut self, log: Arc<dyn MessageLog>) -> Self {
        self.message_log = Some(log);
        self
    }
}
