// src/chat/service.rs
// resolve -> dispatch for one chat request

use tracing::{Span, info, instrument};

use super::dispatcher::Dispatcher;
use super::resolver::ModelResolver;
use super::types::{GenerationResult, ModelCandidate};
use crate::error::{ChatError, Result};
use crate::llm::ModelProvider;

/// Reply plus the name of the model that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub result: GenerationResult,
    pub model: String,
}

/// Stateless request pipeline; shared across requests behind an `Arc`
#[derive(Default)]
pub struct ChatService {
    resolver: ModelResolver,
    dispatcher: Dispatcher,
}

impl ChatService {
    pub fn with_candidates(candidates: Vec<ModelCandidate>) -> Self {
        Self {
            resolver: ModelResolver::new(candidates),
            dispatcher: Dispatcher::default(),
        }
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        self.resolver.candidates()
    }

    #[instrument(skip(self, provider, message), fields(model, message_len = message.len()))]
    pub async fn respond(&self, provider: &dyn ModelProvider, message: &str) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(ChatError::InvalidInput("message is blank".to_string()));
        }

        let resolved = self.resolver.resolve(provider).await?;
        Span::current().record("model", resolved.name.as_str());

        let result = self.dispatcher.dispatch(&resolved, message).await?;
        info!(model = %resolved.name, image = result.image().is_some(), "Chat reply ready");

        Ok(ChatReply {
            result,
            model: resolved.name,
        })
    }
}
