// src/api/messages.rs
// POST /api/messages: direct insert into the message log

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::warn;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::persistence::{MessageRecord, StoredMessage};

pub async fn insert_message_handler(
    State(state): State<AppState>,
    body: Result<Json<MessageRecord>, JsonRejection>,
) -> ApiResult<Json<StoredMessage>> {
    let Some(log) = state.message_log.as_ref() else {
        return Err(ApiError::service_unavailable("Message log is not configured"));
    };

    let Json(record) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    log.insert(record).await.map(Json).map_err(|e| {
        warn!(error = %e, "Message insert failed");
        ApiError::bad_gateway(e.to_string())
    })
}
