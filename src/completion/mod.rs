//! Remote completion-service boundary.
//!
//! [`CompletionClient`] is everything the relay needs from the language-model
//! service: ordered history in, one reply out.  The default implementation is
//! [`openai::OpenAiClient`]; handlers hold the client as
//! `Arc<dyn CompletionClient>` so tests can swap in a canned stub without any
//! network traffic.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::schemas::chat::ChatTurn;

/// Failures at the completion boundary.
///
/// None of these are retried; the caller's user message is already persisted
/// by the time a completion is requested, and it stays persisted.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The HTTP exchange itself failed (connect, TLS, read, …).
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("completion service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A 2xx response that does not contain a usable reply.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// Chat-completion RPC boundary.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the full conversation and return the single generated reply.
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, CompletionError>;
}
