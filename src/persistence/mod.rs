//! Optional message log
//!
//! Chat works without it. From the chat endpoint inserts are
//! fire-and-forget: failures are logged and never reach the user.

mod supabase;

pub use supabase::SupabaseMessageLog;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::chat::Sender;

/// Row as submitted to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub text: String,
    pub sender: String,
    pub user_id: String,
}

impl MessageRecord {
    pub fn new(text: impl Into<String>, sender: Sender, user_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: sender.to_string(),
            user_id: user_id.into(),
        }
    }
}

/// Row as returned by the store after insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Store-assigned key (integer or uuid depending on the table)
    #[serde(default)]
    pub id: Value,
    #[serde(flatten)]
    pub record: MessageRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug)]
pub enum LogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Store { status: u16, message: String },

    #[error("insert returned no rows")]
    NoRowReturned,
}

#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn insert(&self, record: MessageRecord) -> Result<StoredMessage, LogError>;
}

/// Record a user message and the bot reply in the background.
///
/// The reply is only written once the user message is stored, so a
/// transcript never holds an answer without its question. Callers on the
/// request path drop the handle.
pub fn spawn_log_exchange(
    log: Arc<dyn MessageLog>,
    user_id: String,
    user_text: String,
    bot_text: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let user_record = MessageRecord::new(user_text, Sender::User, user_id.clone());
        if let Err(e) = log.insert(user_record).await {
            warn!(user_id = %user_id, error = %e, "Failed to log user message");
            return;
        }

        if bot_text.is_empty() {
            return;
        }

        match log.insert(MessageRecord::new(bot_text, Sender::Bot, user_id.clone())).await {
            Ok(stored) => debug!(user_id = %user_id, id = %stored.id, "Logged chat exchange"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to log bot message"),
        }
    })
}
