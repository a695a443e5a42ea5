// src/api/chat.rs
// POST /api/chat

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::chat::GenerationResult;
use crate::error::ChatError;
use crate::persistence::spawn_log_exchange;

pub const ANONYMOUS_USER: &str = "anonymous";

pub const MESSAGE_TOO_LARGE: &str = "Message is too large";

/// Request body. Both fields stay untyped: a non-string `message` is a
/// validation error rather than an extractor rejection, and a malformed
/// `user_id` only falls back to the anonymous user.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Value>,
}

impl ChatRequest {
    /// Id recorded with logged messages
    pub fn log_user_id(&self) -> String {
        match &self.user_id {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            _ => ANONYMOUS_USER.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub model: String,
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Some(provider) = state.provider.as_deref() else {
        return Err(ChatError::MissingCredential.into());
    };

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            debug!(error = %rejection, "Chat body over size limit");
            return Err(ApiError::payload_too_large(MESSAGE_TOO_LARGE));
        }
        Err(rejection) => {
            debug!(error = %rejection, "Rejected chat body");
            return Err(ChatError::InvalidInput(rejection.body_text()).into());
        }
    };

    let user_id = request.log_user_id();
    let message = match request.message {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => return Err(ChatError::InvalidInput("message must be a non-blank string".into()).into()),
    };

    let reply = state.chat.respond(provider, &message).await.map_err(|e| {
        let api_err = ApiError::from(e);
        debug!(status = %api_err.status, "Chat request failed");
        api_err
    })?;

    if let Some(log) = &state.message_log {
        spawn_log_exchange(log.clone(), user_id, message, reply.result.reply().to_string());
    }

    let response = match reply.result {
        GenerationResult::Text { reply: text } => ChatResponse {
            reply: text,
            image: None,
            model: reply.model,
        },
        GenerationResult::Image { data_uri } => ChatResponse {
            reply: String::new(),
            image: Some(data_uri),
            model: reply.model,
        },
    };

    Ok(Json(response))
}
