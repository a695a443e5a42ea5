// src/api/status.rs

use axum::{Json, extract::State};
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub credential_configured: bool,
    pub candidates: Vec<String>,
    pub message_log: bool,
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        credential_configured: state.provider.is_some(),
        candidates: state.chat.candidates().iter().map(|c| c.name.clone()).collect(),
        message_log: state.message_log.is_some(),
    })
}
