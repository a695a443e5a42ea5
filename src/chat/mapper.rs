// src/chat/mapper.rs
// Turns any chat failure into a status code and a user-facing message

use serde::Serialize;
use std::fmt;

use crate::error::ChatError;

/// Substrings that mark a provider error as temporary overload
pub const TRANSIENT_MARKERS: &[&str] = &["overloaded", "503"];

/// True when a provider error message signals a retryable overload
pub fn is_transient(message: &str) -> bool {
    TRANSIENT_MARKERS.iter().any(|m| message.contains(m))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Config,
    BadInput,
    ServiceUnavailable,
    Unauthorized,
    QuotaExceeded,
    Overloaded,
    SafetyBlocked,
    Generic,
}

impl ErrorCategory {
    pub fn status(&self) -> u16 {
        match self {
            ErrorCategory::Config => 500,
            ErrorCategory::BadInput => 400,
            ErrorCategory::ServiceUnavailable => 503,
            ErrorCategory::Unauthorized => 401,
            ErrorCategory::QuotaExceeded => 429,
            ErrorCategory::Overloaded => 503,
            ErrorCategory::SafetyBlocked => 400,
            ErrorCategory::Generic => 500,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Config => "config",
            ErrorCategory::BadInput => "bad-input",
            ErrorCategory::ServiceUnavailable => "service-unavailable",
            ErrorCategory::Unauthorized => "unauthorized",
            ErrorCategory::QuotaExceeded => "quota-exceeded",
            ErrorCategory::Overloaded => "overloaded",
            ErrorCategory::SafetyBlocked => "safety-blocked",
            ErrorCategory::Generic => "generic",
        };
        f.write_str(s)
    }
}

/// One classification rule: any needle found in the error text selects the
/// category and message.
struct Rule {
    needles: &'static [&'static str],
    category: ErrorCategory,
    message: &'static str,
}

/// Evaluated top to bottom, first match wins. Order matters: a message can
/// carry several markers at once.
const PROVIDER_RULES: &[Rule] = &[
    Rule {
        needles: &["API_KEY", "401"],
        category: ErrorCategory::Unauthorized,
        message: "Invalid API key. Please check your configuration.",
    },
    Rule {
        needles: &["QUOTA_EXCEEDED", "429"],
        category: ErrorCategory::QuotaExceeded,
        message: "API quota exceeded. Please try again later.",
    },
    Rule {
        needles: TRANSIENT_MARKERS,
        category: ErrorCategory::Overloaded,
        message: "AI service is currently busy. Please try again in a moment.",
    },
    Rule {
        needles: &["SAFETY"],
        category: ErrorCategory::SafetyBlocked,
        message: "Content was blocked for safety reasons.",
    },
];

const GENERIC_MESSAGE: &str = "AI service encountered an error. Please try again.";

/// Displayable outcome of a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedError {
    pub category: ErrorCategory,
    pub status: u16,
    pub message: String,
}

impl MappedError {
    fn new(category: ErrorCategory, message: &str) -> Self {
        Self {
            category,
            status: category.status(),
            message: message.to_string(),
        }
    }
}

/// Classify raw provider error text against the rule table
pub fn classify(error_text: &str) -> MappedError {
    PROVIDER_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|n| error_text.contains(n)))
        .map(|rule| MappedError::new(rule.category, rule.message))
        .unwrap_or_else(|| MappedError::new(ErrorCategory::Generic, GENERIC_MESSAGE))
}

/// Map any chat error to a status and message. Never fails.
pub fn map_error(err: &ChatError) -> MappedError {
    match err {
        ChatError::MissingCredential => MappedError::new(ErrorCategory::Config, "API configuration error"),
        ChatError::InvalidInput(_) => MappedError::new(ErrorCategory::BadInput, "Valid message is required"),
        ChatError::NoModelAvailable => MappedError::new(
            ErrorCategory::ServiceUnavailable,
            "AI service temporarily unavailable. Please try again later.",
        ),
        ChatError::ImageGenerationFailed(_) => MappedError::new(ErrorCategory::Generic, "Image generation failed."),
        ChatError::ServiceOverloaded { .. } => MappedError::new(
            ErrorCategory::Overloaded,
            "AI service is currently overloaded. Please try again in a few moments.",
        ),
        ChatError::EmptyResponse | ChatError::Provider(_) => classify(&err.to_string()),
    }
}
