// src/error.rs
// Error types for the chat pipeline

use thiserror::Error;

use crate::llm::ProviderError;

/// Everything that can stop a chat request from producing a reply.
///
/// Validation variants are raised before any network call. Provider
/// failures keep the raw provider message so the response mapper can
/// classify them.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingCredential,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("No working Gemini models found")]
    NoModelAvailable,

    #[error("image generation failed: {0}")]
    ImageGenerationFailed(String),

    #[error("service overloaded after {attempts} attempts")]
    ServiceOverloaded { attempts: u32 },

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Convenience type alias for Result using ChatError
pub type Result<T> = std::result::Result<T, ChatError>;
