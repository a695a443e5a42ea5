// src/chat/resolver.rs
// Picks the first candidate model that answers a probe

use tracing::{debug, info, warn};

use super::types::{ModelCandidate, ResolvedModel};
use crate::error::{ChatError, Result};
use crate::llm::ModelProvider;

/// Prompt sent to each candidate to check it is servable
pub const PROBE_PROMPT: &str = "Hello";

/// Walks the candidate list in priority order and returns the first model
/// whose probe succeeds. Probes run one at a time; a failed candidate is
/// skipped, never retried, whatever the failure was.
pub struct ModelResolver {
    candidates: Vec<ModelCandidate>,
}

impl ModelResolver {
    pub fn new(candidates: Vec<ModelCandidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub async fn resolve(&self, provider: &dyn ModelProvider) -> Result<ResolvedModel> {
        for candidate in &self.candidates {
            let handle = provider.model(&candidate.name);

            match handle.generate_text(PROBE_PROMPT).await {
                Ok(_) => {
                    info!(model = %candidate.name, "Resolved working model");
                    return Ok(ResolvedModel {
                        handle,
                        name: candidate.name.clone(),
                    });
                }
                Err(e) => {
                    warn!(model = %candidate.name, error = %e, "Model not available");
                    continue;
                }
            }
        }

        debug!(tried = self.candidates.len(), "No candidate answered the probe");
        Err(ChatError::NoModelAvailable)
    }
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new(ModelCandidate::defaults())
    }
}
