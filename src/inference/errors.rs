//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility — these types carry the context needed to build
//! meaningful log entries.

use thiserror::Error;

/// Errors that can occur during a chat completion call.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed {
        endpoint: String,
        reason: String,
    },

    /// The model endpoint did not respond within the configured timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout {
        duration_secs: u64,
    },

    /// Non-2xx HTTP response from the model endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        body: String,
    },

    /// The response body could not be read or was not JSON.
    #[error("invalid response: {reason}")]
    InvalidResponse {
        reason: String,
    },

    /// Client construction or configuration error.
    #[error("config error: {reason}")]
    ConfigError {
        reason: String,
    },
}

impl InferenceError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            InferenceError::ConnectionFailed { .. }
                | InferenceError::Timeout { .. }
                | InferenceError::HttpError { status: 429, .. }
                | InferenceError::HttpError { status: 500..=504, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transient() {
        assert!(InferenceError::Timeout { duration_secs: 30 }.is_transient());
        assert!(InferenceError::HttpError {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(InferenceError::HttpError {
            status: 429,
            body: "rate limited".into()
        }
        .is_transient());
        assert!(!InferenceError::HttpError {
            status: 401,
            body: "bad key".into()
        }
        .is_transient());
        assert!(!InferenceError::InvalidResponse {
            reason: "not json".into()
        }
        .is_transient());
    }

    #[test]
    fn test_display() {
        let err = InferenceError::HttpError {
            status: 400,
            body: "bad request".into(),
        };
        assert_eq!(err.to_string(), "HTTP 400: bad request");
    }
}
