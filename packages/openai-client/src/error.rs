//! Error types for OpenAI client.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// API key rejected (401/403)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limit or quota exceeded (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other non-2xx response or an empty result
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Classify a transport-level failure.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Classify a non-2xx response by status code.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth(body),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(body),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::Timeout,
            _ => Self::Api(format!("{}: {}", status, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            OpenAIError::from_status(StatusCode::UNAUTHORIZED, "bad key".into()),
            OpenAIError::Auth(_)
        ));
        assert!(matches!(
            OpenAIError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
            OpenAIError::RateLimited(_)
        ));
        assert!(matches!(
            OpenAIError::from_status(StatusCode::GATEWAY_TIMEOUT, String::new()),
            OpenAIError::Timeout
        ));

        let err = OpenAIError::from_status(StatusCode::BAD_REQUEST, "bad input".into());
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("bad input"));
    }
}
