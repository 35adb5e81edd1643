//! Errors raised by text-generation backends.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single generation attempt.
///
/// These are operator-facing: callers log them and substitute a canned reply.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Request failed: {message}")]
    Request { message: String, is_retryable: bool },

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("The service returned no text")]
    EmptyResponse,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { is_retryable, .. } | Self::Http { is_retryable, .. } => *is_retryable,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

impl From<GenerationError> for rainbow_core::RainbowError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredentials(message) => Self::Config(message),
            other => Self::Generation(other.to_string()),
        }
    }
}
