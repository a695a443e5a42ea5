// src/chat/session.rs
// In-memory conversation held by a chat client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{ChatMessage, MessageId, Sender};

/// First bot message of every session
pub const GREETING: &str = "Hello! How can I help you?";

/// Shown when the server gave no usable reply and no error text
pub const FALLBACK_ERROR: &str = "Sorry, I encountered an error. Please try again.";

/// Body of a `/api/chat` response as the client sees it; success and error
/// shapes share one struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A settled request: `ok` mirrors a 2xx status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub ok: bool,
    pub body: ChatResponseBody,
}

/// The request never settled into a response (connection, decode, ...)
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

/// One network call per user message
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str) -> Result<TransportResponse, TransportError>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyInput,
}

/// Append-only transcript plus the busy flag shown while a request is out
pub struct ChatSession<T> {
    transport: T,
    messages: Vec<ChatMessage>,
    next_id: u64,
    busy: bool,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        let mut session = Self {
            transport,
            messages: Vec::new(),
            next_id: 1,
            busy: false,
        };
        let id = session.allocate_id();
        session.messages.push(ChatMessage::text(id, Sender::Bot, GREETING));
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_bot_text(&mut self, text: &str) {
        let id = self.allocate_id();
        self.messages.push(ChatMessage::text(id, Sender::Bot, text));
    }

    /// Send one message and return the bot messages appended for it.
    ///
    /// The user message is appended before the request goes out. On
    /// settlement zero, one or two bot messages follow (text and/or image),
    /// or a single error message.
    pub async fn send(&mut self, text: &str) -> Result<&[ChatMessage], SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let id = self.allocate_id();
        self.messages.push(ChatMessage::text(id, Sender::User, text));
        let first_reply = self.messages.len();

        self.busy = true;
        let outcome = self.transport.send(text).await;

        match outcome {
            Ok(TransportResponse { ok: true, body }) if has_content(&body) => {
                debug!(model = ?body.model, "Reply received");
                if let Some(reply) = body.reply.as_deref().filter(|r| !r.is_empty()) {
                    self.push_bot_text(reply);
                }
                if let Some(image) = body.image.as_deref().filter(|i| !i.is_empty()) {
                    let id = self.allocate_id();
                    self.messages.push(ChatMessage::image(id, image));
                }
            }
            Ok(TransportResponse { body, .. }) => {
                let message = body.error.as_deref().unwrap_or(FALLBACK_ERROR).to_string();
                self.push_bot_text(&message);
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                self.push_bot_text(FALLBACK_ERROR);
            }
        }

        self.busy = false;
        Ok(&self.messages[first_reply..])
    }
}

fn has_content(body: &ChatResponseBody) -> bool {
    body.reply.as_deref().is_some_and(|r| !r.is_empty())
        || body.image.as_deref().is_some_and(|i| !i.is_empty())
}
