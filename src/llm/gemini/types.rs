// src/llm/gemini/types.rs
// Request and error envelope types for the generateContent API

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Clone)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize, Clone)]
pub struct GeminiTextPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

impl GeminiRequest {
    /// Single user turn carrying `prompt`
    pub fn user_text(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiTextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: None,
        }
    }

    /// Single user turn that asks for image output alongside text
    pub fn user_image(prompt: &str) -> Self {
        Self {
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            }),
            ..Self::user_text(prompt)
        }
    }
}

/// `{"error": {...}}` body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<Vec<Value>>,
}
