// src/chat/dispatcher.rs
// Sends a message to the resolved model, retrying transient overloads

use std::time::Duration;
use tracing::{info, warn};

use super::mapper::is_transient;
use super::types::{GenerationResult, IMAGE_COMMAND_PREFIX, ResolvedModel};
use crate::error::{ChatError, Result};

/// Default maximum attempts for a text generation (first try included)
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Delay unit; the wait after attempt k is k units (linear, not doubling)
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Wait before the attempt that follows failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

/// Routes a message to text or image generation on the one model resolved
/// for the request.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    retry: RetryPolicy,
}

impl Dispatcher {
    pub async fn dispatch(&self, resolved: &ResolvedModel, message: &str) -> Result<GenerationResult> {
        match message.strip_prefix(IMAGE_COMMAND_PREFIX) {
            Some(prompt) => self.dispatch_image(resolved, prompt).await,
            None => self.dispatch_text(resolved, message).await,
        }
    }

    /// Image requests are single-shot. Every failure, including a provider
    /// error, surfaces as `ImageGenerationFailed`.
    async fn dispatch_image(&self, resolved: &ResolvedModel, prompt: &str) -> Result<GenerationResult> {
        let response = resolved
            .handle
            .generate_image(prompt)
            .await
            .map_err(|e| ChatError::ImageGenerationFailed(e.message))?;

        let data = response
            .inline_data()
            .first()
            .map(|inline| inline.data.clone())
            .ok_or_else(|| ChatError::ImageGenerationFailed("No image generated".to_string()))?;

        info!(model = %resolved.name, bytes = data.len(), "Image generated");
        Ok(GenerationResult::Image {
            data_uri: format!("data:image/png;base64,{}", data),
        })
    }

    async fn dispatch_text(&self, resolved: &ResolvedModel, message: &str) -> Result<GenerationResult> {
        let mut attempt: u32 = 0;

        let response = loop {
            attempt += 1;

            match resolved.handle.generate_text(message).await {
                Ok(response) => break response,
                Err(e) if is_transient(&e.message) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(model = %resolved.name, attempts = attempt, "Giving up on overloaded model");
                        return Err(ChatError::ServiceOverloaded { attempts: attempt });
                    }

                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        model = %resolved.name,
                        attempt = attempt,
                        error = %e,
                        "Transient error, retrying in {:?}...",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let text = response.text()?;
        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        Ok(GenerationResult::Text { reply: text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::ScriptedModel;
    use crate::llm::{Candidate, Content, GenerateContentResponse, GenerativeModel, InlineData, Part, ProviderError};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn resolved(model: &Arc<ScriptedModel>) -> ResolvedModel {
        ResolvedModel {
            handle: Arc::clone(model) as Arc<dyn GenerativeModel>,
            name: "gemini-1.5-flash".into(),
        }
    }

    fn image_response(payloads: &[&str]) -> GenerateContentResponse {
        let mut parts = vec![Part {
            text: Some("Here is your image".into()),
            inline_data: None,
        }];
        parts.extend(payloads.iter().map(|p| Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: Some("image/png".into()),
                data: p.to_string(),
            }),
        }));
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content { role: Some("model".into()), parts }),
                finish_reason: Some("STOP".into()),
            }],
            prompt_feedback: None,
        }
    }

    fn overloaded() -> ProviderError {
        ProviderError::with_status(503, "[503 Service Unavailable] The model is overloaded.")
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_text_reply() {
        let model = Arc::new(ScriptedModel::replying("m", "Hi there!"));
        let result = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap();
        assert_eq!(result, GenerationResult::Text { reply: "Hi there!".into() });
        assert_eq!(model.text_calls(), 1);
        assert_eq!(model.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_prefixed_messages_never_request_images() {
        let model = Arc::new(ScriptedModel::replying("m", "ok"));
        let dispatcher = Dispatcher::default();
        for message in ["/image", "/Image cat", "image cat", " /image cat", "/imagecat"] {
            dispatcher.dispatch(&resolved(&model), message).await.unwrap();
        }
        assert_eq!(model.image_calls(), 0);
        assert_eq!(model.text_calls(), 5);
    }

    #[tokio::test]
    async fn test_image_prompt_is_remainder() {
        let model = Arc::new(ScriptedModel::replying("m", "unused").with_image(Ok(image_response(&["iVBORw0KGgo", "second"]))));
        let result = Dispatcher::default().dispatch(&resolved(&model), "/image sunset").await.unwrap();

        assert_eq!(
            result,
            GenerationResult::Image { data_uri: "data:image/png;base64,iVBORw0KGgo".into() }
        );
        assert_eq!(result.reply(), "");

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "sunset");
        assert_eq!(model.text_calls(), 0);
    }

    #[tokio::test]
    async fn test_image_without_payload_fails() {
        let model = Arc::new(ScriptedModel::replying("m", "unused").with_image(Ok(image_response(&[]))));
        let err = Dispatcher::default().dispatch(&resolved(&model), "/image cat").await.unwrap_err();
        assert!(matches!(err, ChatError::ImageGenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_image_provider_error_is_image_failure_without_retry() {
        let model = Arc::new(ScriptedModel::replying("m", "unused").with_image(Err(overloaded())));
        let err = Dispatcher::default().dispatch(&resolved(&model), "/image cat").await.unwrap_err();
        assert!(matches!(err, ChatError::ImageGenerationFailed(_)));
        assert_eq!(model.image_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_back_off_linearly() {
        let model = Arc::new(
            ScriptedModel::replying("m", "finally")
                .then_text(Err(overloaded()))
                .then_text(Err(ProviderError::new("model is overloaded, try later"))),
        );

        let start = Instant::now();
        let result = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap();
        assert_eq!(result.reply(), "finally");

        let calls = model.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].at - calls[0].at, Duration::from_millis(1000));
        assert_eq!(calls[2].at - calls[1].at, Duration::from_millis(2000));
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_ceiling_is_service_overloaded() {
        let model = Arc::new(ScriptedModel::failing("m", "[503 Service Unavailable] The model is overloaded."));

        let start = Instant::now();
        let err = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap_err();

        assert!(matches!(err, ChatError::ServiceOverloaded { attempts: 3 }));
        assert_eq!(model.text_calls(), 3);
        // No wait after the final attempt
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_is_not_retried() {
        let model = Arc::new(ScriptedModel::failing("m", "[400 Bad Request] API key not valid. API_KEY_INVALID"));

        let start = Instant::now();
        let err = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap_err();

        match err {
            ChatError::Provider(e) => assert!(e.message.contains("API_KEY_INVALID")),
            other => panic!("expected provider error, got {:?}", other),
        }
        assert_eq!(model.text_calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_after_transient_stops_retrying() {
        let model = Arc::new(
            ScriptedModel::failing("m", "[429 Too Many Requests] quota")
                .then_text(Err(overloaded())),
        );
        let err = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Provider(_)));
        assert_eq!(model.text_calls(), 2);
    }

    #[tokio::test]
    async fn test_blank_replies_are_empty_response() {
        for reply in ["", "   ", "\n\t"] {
            let model = Arc::new(ScriptedModel::replying("m", reply));
            let err = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap_err();
            assert!(matches!(err, ChatError::EmptyResponse), "reply {:?}", reply);
        }
    }

    #[tokio::test]
    async fn test_safety_block_surfaces_as_provider_error() {
        let blocked = GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("SAFETY".into()),
            }],
            prompt_feedback: None,
        };
        let model = Arc::new(ScriptedModel::replying("m", "unused").then_text(Ok(blocked)));
        let err = Dispatcher::default().dispatch(&resolved(&model), "hi").await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
        assert_eq!(model.text_calls(), 1);
    }
}
