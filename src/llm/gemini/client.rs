// src/llm/gemini/client.rs
// Non-streaming Gemini client; one POST per generation call

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{GeminiErrorEnvelope, GeminiRequest};
use crate::llm::{GenerateContentResponse, GenerativeModel, ModelProvider, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 30;

struct Shared {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

/// Gemini API client. Cheap to clone; model sessions share one HTTP pool.
#[derive(Clone)]
pub struct GeminiClient {
    shared: Arc<Shared>,
}

impl GeminiClient {
    /// Create a client against the public endpoint with the default timeout
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(
            api_key,
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client against a custom endpoint (proxies, tests)
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            shared: Arc::new(Shared {
                http,
                api_key,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.shared.base_url
    }
}

impl ModelProvider for GeminiClient {
    fn model(&self, name: &str) -> Arc<dyn GenerativeModel> {
        Arc::new(GeminiModel {
            shared: Arc::clone(&self.shared),
            name: name.to_string(),
        })
    }
}

/// Session bound to a single Gemini model
pub struct GeminiModel {
    shared: Arc<Shared>,
    name: String,
}

impl GeminiModel {
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.shared.base_url, self.name, self.shared.api_key
        )
    }

    async fn generate(&self, request: GeminiRequest) -> Result<GenerateContentResponse, ProviderError> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();

        debug!(request_id = %request_id, model = %self.name, "Gemini generateContent request");

        // The endpoint embeds the key, so transport errors are reported without the URL
        let response = self
            .shared
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(format!(
                    "Error fetching from {}: {}",
                    self.name,
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ProviderError::with_status(status.as_u16(), describe_failure(&self.name, status, &body));
            warn!(request_id = %request_id, model = %self.name, status = %status, "Gemini API error");
            return Err(err);
        }

        let data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("Failed to parse Gemini response: {}", e.without_url())))?;

        info!(
            request_id = %request_id,
            model = %self.name,
            duration_ms = start_time.elapsed().as_millis() as u64,
            candidates = data.candidates.len(),
            "Gemini generateContent complete"
        );

        Ok(data)
    }
}

/// Render a non-2xx response the way the provider SDK does:
/// `[<status>] <message> <details>`. Classification downstream relies on the
/// status code and detail reasons (`API_KEY_INVALID`, ...) being present.
fn describe_failure(model: &str, status: reqwest::StatusCode, body: &str) -> String {
    let detail = match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) => {
            let mut text = envelope.error.message;
            if let Some(s) = envelope.error.status {
                text.push_str(&format!(" ({})", s));
            }
            if let Some(details) = envelope.error.details.filter(|d| !d.is_empty()) {
                text.push(' ');
                text.push_str(&serde_json::to_string(&details).unwrap_or_default());
            }
            text
        }
        Err(_) => body.trim().to_string(),
    };

    format!("Error fetching from {}: [{}] {}", model, status, detail)
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, prompt: &str) -> Result<GenerateContentResponse, ProviderError> {
        self.generate(GeminiRequest::user_text(prompt)).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<GenerateContentResponse, ProviderError> {
        self.generate(GeminiRequest::user_image(prompt)).await
    }
}
