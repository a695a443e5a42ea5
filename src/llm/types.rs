// src/llm/types.rs
// generateContent response shapes and reply extraction

use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Finish reasons that mean the candidate's text must not be shown
const BLOCKED_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Binary payload embedded directly in a response part (base64 encoded)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Response with a single text part, as a model would return it
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: Some(text.into()),
                        inline_data: None,
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }

    /// Concatenated text of the first candidate.
    ///
    /// A blocked candidate or a blocked prompt is an error naming the block
    /// reason. A response with no candidates and no feedback yields `""`.
    pub fn text(&self) -> Result<String, ProviderError> {
        if let Some(candidate) = self.candidates.first() {
            if let Some(reason) = candidate
                .finish_reason
                .as_deref()
                .filter(|r| BLOCKED_FINISH_REASONS.contains(r))
            {
                return Err(ProviderError::new(format!(
                    "Candidate was blocked due to {}",
                    reason
                )));
            }

            let text = candidate
                .content
                .iter()
                .flat_map(|c| c.parts.iter())
                .filter_map(|p| p.text.as_deref())
                .collect::<String>();
            return Ok(text);
        }

        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ProviderError::new(format!(
                "Text not available. Response was blocked due to {}",
                reason
            )));
        }

        Ok(String::new())
    }

    /// Inline payloads of the first candidate, in part order
    pub fn inline_data(&self) -> Vec<&InlineData> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.inline_data.as_ref()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_concatenates_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(response.text().unwrap(), "Hello, world");
    }

    #[test]
    fn test_text_only_reads_first_candidate() {
        let response = parse(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}]}},
                {"content": {"parts": [{"text": "second"}]}}
            ]
        }));
        assert_eq!(response.text().unwrap(), "first");
    }

    #[test]
    fn test_blocked_candidate_names_reason() {
        let response = parse(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }));
        let err = response.text().unwrap_err();
        assert!(err.message.contains("SAFETY"), "got: {}", err);
    }

    #[test]
    fn test_blocked_prompt_names_reason() {
        let response = parse(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        let err = response.text().unwrap_err();
        assert!(err.message.contains("blocked due to SAFETY"));
    }

    #[test]
    fn test_no_candidates_is_empty_text() {
        let response = parse(json!({}));
        assert_eq!(response.text().unwrap(), "");
    }

    #[test]
    fn test_inline_data_skips_text_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                    {"inlineData": {"mimeType": "image/png", "data": "BBBB"}}
                ]}
            }]
        }));
        let images = response.inline_data();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].data, "AAAA");
        assert_eq!(images[0].mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_from_text() {
        let response = GenerateContentResponse::from_text("hi");
        assert_eq!(response.text().unwrap(), "hi");
        assert!(response.inline_data().is_empty());
    }
}
