#![deny(unsafe_code)]

use std::sync::Arc;

/// Backend contract: one question in, one answer (or delivery failure) out.
mod backend;
/// HTTP transport for the question/answer protocol.
mod http;

pub use backend::{
    Answer, AnswerBackend, AnswerReply, AskHandle, AskRequest, AskWorker, DeliveryError,
    DeliveryResult,
};
pub use http::HttpAnswerBackend;

/// Builds the production backend for the given ask endpoint.
pub fn create_backend(endpoint: impl Into<String>) -> Arc<dyn AnswerBackend> {
    Arc::new(HttpAnswerBackend::new(endpoint))
}
