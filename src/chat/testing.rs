// src/chat/testing.rs
// Scripted models for unit tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::llm::{GenerateContentResponse, GenerativeModel, ModelProvider, ProviderError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    Text,
    Image,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub prompt: String,
    pub at: Instant,
}

type Outcome = Result<GenerateContentResponse, ProviderError>;

/// Model that replays queued outcomes; once the queue is drained the
/// fallback outcome repeats forever.
pub struct ScriptedModel {
    name: String,
    text_queue: Mutex<VecDeque<Outcome>>,
    text_fallback: Outcome,
    image_outcome: Outcome,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn replying(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            text_queue: Mutex::new(VecDeque::new()),
            text_fallback: Ok(GenerateContentResponse::from_text(reply)),
            image_outcome: Ok(GenerateContentResponse::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            text_fallback: Err(ProviderError::new(message)),
            image_outcome: Err(ProviderError::new(message)),
            ..Self::replying(name, "")
        }
    }

    /// Queue one text outcome ahead of the fallback
    pub fn then_text(self, outcome: Outcome) -> Self {
        self.text_queue.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_image(mut self, outcome: Outcome) -> Self {
        self.image_outcome = outcome;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn text_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.kind == CallKind::Text).count()
    }

    pub fn image_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.kind == CallKind::Image).count()
    }

    fn record(&self, kind: CallKind, prompt: &str) {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            prompt: prompt.to_string(),
            at: Instant::now(),
        });
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, prompt: &str) -> Outcome {
        self.record(CallKind::Text, prompt);
        let queued = self.text_queue.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.text_fallback.clone())
    }

    async fn generate_image(&self, prompt: &str) -> Outcome {
        self.record(CallKind::Image, prompt);
        self.image_outcome.clone()
    }
}

/// Provider over a fixed set of scripted models. Unknown names get a model
/// that fails like a 404 from the API.
#[derive(Default)]
pub struct ScriptedProvider {
    models: HashMap<String, Arc<ScriptedModel>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, model: ScriptedModel) -> Self {
        self.models.insert(model.name.clone(), Arc::new(model));
        self
    }

    pub fn get(&self, name: &str) -> Arc<ScriptedModel> {
        Arc::clone(&self.models[name])
    }
}

impl ModelProvider for ScriptedProvider {
    fn model(&self, name: &str) -> Arc<dyn GenerativeModel> {
        match self.models.get(name) {
            Some(model) => Arc::clone(model) as Arc<dyn GenerativeModel>,
            None => Arc::new(ScriptedModel::failing(
                name,
                &format!("[404 Not Found] models/{} is not found", name),
            )),
        }
    }
}
