// src/chat/types.rs
// Core chat data model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::llm::GenerativeModel;

/// Models tried in priority order when no override is configured
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
    "gemini-1.0-pro",
];

/// Literal command prefix that turns a message into an image request
pub const IMAGE_COMMAND_PREFIX: &str = "/image ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Monotonic per-session message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// One entry in a chat transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `data:` URI for image replies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub sender: Sender,
}

impl ChatMessage {
    pub fn text(id: MessageId, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            text: Some(text.into()),
            image: None,
            sender,
        }
    }

    pub fn image(id: MessageId, data_uri: impl Into<String>) -> Self {
        Self {
            id,
            text: None,
            image: Some(data_uri.into()),
            sender: Sender::Bot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub name: String,
}

impl ModelCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The built-in priority list
    pub fn defaults() -> Vec<ModelCandidate> {
        DEFAULT_MODEL_CANDIDATES.iter().map(|n| ModelCandidate::new(*n)).collect()
    }

    /// Candidates from configured names; an empty list means the defaults
    pub fn from_names<I, S>(names: I) -> Vec<ModelCandidate>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates: Vec<ModelCandidate> = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.trim().is_empty())
            .map(|n| ModelCandidate::new(n.trim()))
            .collect();

        if candidates.is_empty() {
            Self::defaults()
        } else {
            candidates
        }
    }
}

/// The one model a request is served by
#[derive(Clone)]
pub struct ResolvedModel {
    pub handle: Arc<dyn GenerativeModel>,
    pub name: String,
}

impl fmt::Debug for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModel").field("name", &self.name).finish()
    }
}

/// Successful dispatch outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Text { reply: String },
    Image { data_uri: String },
}

impl GenerationResult {
    /// Text shown to the user; empty for image results
    pub fn reply(&self) -> &str {
        match self {
            GenerationResult::Text { reply } => reply,
            GenerationResult::Image { .. } => "",
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            GenerationResult::Text { .. } => None,
            GenerationResult::Image { data_uri } => Some(data_uri),
        }
    }
}
