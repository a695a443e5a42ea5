//! Generative model seam
//!
//! The chat pipeline only talks to [`ModelProvider`] and [`GenerativeModel`];
//! the Gemini REST client is the production implementation and tests swap
//! in scripted models.

pub mod gemini;
mod types;

pub use gemini::{GeminiClient, GeminiModel};
pub use types::{Candidate, Content, GenerateContentResponse, InlineData, Part, PromptFeedback};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a provider call.
///
/// The message carries the provider's own wording (HTTP status, error
/// status, details) because downstream classification is substring based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    /// HTTP status returned by the provider, when there was a response at all
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

/// A model session bound to one model identifier
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, e.g. `gemini-1.5-flash`
    fn name(&self) -> &str;

    /// Plain text generation for a single user turn
    async fn generate_text(&self, prompt: &str) -> Result<GenerateContentResponse, ProviderError>;

    /// Generation that asks the model for image output
    async fn generate_image(&self, prompt: &str) -> Result<GenerateContentResponse, ProviderError>;
}

/// Hands out model sessions by name. Creating a session never touches the
/// network; only generation calls do.
pub trait ModelProvider: Send + Sync {
    fn model(&self, name: &str) -> Arc<dyn GenerativeModel>;
}
