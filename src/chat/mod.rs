//! Chat pipeline
//!
//! - `resolver`: first candidate model that answers a probe
//! - `dispatcher`: text or image generation with bounded retry
//! - `mapper`: failure -> status code and user-facing message
//! - `service`: the three above for one request
//! - `session`: client-side transcript

pub mod dispatcher;
pub mod mapper;
pub mod resolver;
pub mod service;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{Dispatcher, RetryPolicy};
pub use mapper::{ErrorCategory, MappedError, classify, map_error};
pub use resolver::ModelResolver;
pub use service::{ChatReply, ChatService};
pub use session::{ChatResponseBody, ChatSession, ChatTransport, TransportError, TransportResponse};
pub use types::{ChatMessage, GenerationResult, MessageId, ModelCandidate, ResolvedModel, Sender};
