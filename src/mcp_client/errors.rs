//! Tool-server client error types.

use thiserror::Error;

/// Errors that can occur while talking to tool servers.
#[derive(Debug, Error)]
pub enum McpError {
    /// Network failure, timeout, or a body that could not be read.
    #[error("transport error for '{url}': {reason}")]
    TransportError {
        url: String,
        reason: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from '{url}': {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// The server answered 2xx but the body was not the expected JSON.
    #[error("invalid response from '{url}': {reason}")]
    InvalidResponse {
        url: String,
        reason: String,
    },

    /// Configuration error (bad server URL, unusable client settings).
    #[error("config error: {reason}")]
    ConfigError {
        reason: String,
    },
}
