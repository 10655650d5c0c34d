//! Shared test helpers for loop tests.

use std::sync::Mutex;

use async_trait::async_trait;

use skein_core::backend::{CompletionBackend, CompletionRequest, CompletionResponse};
use skein_core::error::BackendError;

/// A mock backend that returns a sequence of scripted text responses.
///
/// Each call to `complete` returns the next response in the queue. Once the
/// queue is exhausted, the last response repeats (so iteration-bound tests
/// can script "always returns an action" with a single entry).
pub struct SequentialMockBackend {
    responses: Mutex<Vec<String>>,
    error: Option<BackendError>,
    call_count: Mutex<usize>,
}

impl SequentialMockBackend {
    pub fn new(responses: Vec<String>) -> Self {
        assert!(!responses.is_empty(), "scripted backend needs at least one response");
        Self {
            responses: Mutex::new(responses),
            error: None,
            call_count: Mutex::new(0),
        }
    }

    /// A backend that returns the same response on every call.
    pub fn single(text: &str) -> Self {
        Self::new(vec![text.to_string()])
    }

    /// A backend whose every call fails with a network error.
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Mutex::new(vec![]),
            error: Some(BackendError::Network(message.into())),
            call_count: Mutex::new(0),
        }
    }

    /// How many times `complete` was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl CompletionBackend for SequentialMockBackend {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let responses = self.responses.lock().unwrap();
        let index = (*self.call_count.lock().unwrap() - 1).min(responses.len() - 1);
        Ok(CompletionResponse {
            content: responses[index].clone(),
            model: request.model,
        })
    }
}
