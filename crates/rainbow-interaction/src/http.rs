//! Status and transport error mapping shared by the HTTP agents.

use crate::error::GenerationError;
use reqwest::StatusCode;

pub(crate) fn map_request_error(provider: &str, err: reqwest::Error) -> GenerationError {
    GenerationError::Request {
        message: format!("{provider} request failed: {err}"),
        is_retryable: err.is_connect() || err.is_timeout(),
    }
}

/// Builds an HTTP error, preferring the provider's own message when `extract`
/// finds one in the body.
pub(crate) fn map_http_error(
    status: StatusCode,
    body: String,
    extract: impl FnOnce(&str) -> Option<String>,
) -> GenerationError {
    let message = extract(&body).unwrap_or(body);
    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    GenerationError::Http {
        status: status.as_u16(),
        message,
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_are_retryable() {
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "slow down".into(), |_| None);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, "{}".into(), |_| {
            Some("bad key".into())
        });
        assert!(!err.is_retryable());
        assert!(matches!(err, GenerationError::Http { status: 401, .. }));
        assert!(err.to_string().contains("bad key"));
    }
}
