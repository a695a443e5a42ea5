// src/client/mod.rs
// HTTP transport from a chat session to a running parley server

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use tracing::debug;

use crate::chat::{ChatResponseBody, ChatTransport, TransportError, TransportResponse};

pub struct HttpChatTransport {
    http: HttpClient,
    endpoint: String,
    user_id: Option<String>,
}

impl HttpChatTransport {
    /// No request timeout: the server bounds each exchange with its own
    /// model timeout and overload retries, and the REPL waits for the result.
    pub fn new(server_url: &str) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint: format!("{}/api/chat", server_url.trim_end_matches('/')),
            user_id: None,
        }
    }

    /// Tag every message with a user id for the server-side log
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, message: &str) -> Result<TransportResponse, TransportError> {
        let mut body = json!({ "message": message });
        if let Some(user_id) = &self.user_id {
            body["user_id"] = json!(user_id);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "Chat server responded");

        let body = response
            .json::<ChatResponseBody>()
            .await
            .map_err(|e| TransportError(format!("Invalid response body: {}", e)))?;

        Ok(TransportResponse {
            ok: status.is_success(),
            body,
        })
    }
}
