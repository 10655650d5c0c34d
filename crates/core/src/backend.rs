//! Completion backend trait — the abstraction over the LLM.
//!
//! A backend knows how to turn a message list into a single text response
//! or an error. The loop calls `complete()` without knowing which backend
//! is behind it. The contract is deliberately single request/response; the
//! loop never depends on token-by-token streaming.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::message::Message;

/// Configuration for a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use
    pub model: String,

    /// The conversation messages, in turn order
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw generated text
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// The completion backend trait.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, BackendError>;
}
