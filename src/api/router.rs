// src/api/router.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::chat::chat_handler;
use super::messages::insert_message_handler;
use super::state::AppState;
use super::status::status_handler;

pub const API_VERSION: &str = "1";

/// Max request body for chat and message inserts; well above any prompt
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // API version header on all responses
    let version_header = SetResponseHeaderLayer::if_not_present(
        header::HeaderName::from_static("x-api-version"),
        HeaderValue::from_static(API_VERSION),
    );

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/messages", post(insert_message_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(version_header)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
