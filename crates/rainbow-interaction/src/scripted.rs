//! A generator that replays queued outcomes and records every request.
//!
//! Used for offline runs of the CLI and as the test double across the workspace.

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, TextGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

/// Replays queued results in order, then falls back to a fixed reply (or an
/// error when none is set).
#[derive(Default)]
pub struct ScriptedGenerator {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every request with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    /// Fails every request.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Sleeps before answering; lets tests exercise timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, text: impl Into<String>) {
        self.queue.lock().await.push_back(Ok(text.into()));
    }

    pub async fn push_error(&self, error: GenerationError) {
        self.queue.lock().await.push_back(Err(error));
    }

    pub async fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.calls.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(next) = self.queue.lock().await.pop_front() {
            return next;
        }
        self.fallback.clone().ok_or(GenerationError::Request {
            message: "scripted generator has no reply queued".into(),
            is_retryable: false,
        })
    }
}
