// src/api/mod.rs
// HTTP surface: chat, message log, status

pub mod chat;
pub mod error;
pub mod messages;
pub mod router;
pub mod state;
pub mod status;

pub use chat::{ChatRequest, ChatResponse};
pub use error::{ApiError, ApiResult};
pub use router::{API_VERSION, MAX_BODY_BYTES, create_router};
pub use state::AppState;
