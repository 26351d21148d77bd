//! Authenticated HTTP transport with bounded retry.
//!
//! Every request carries `Authorization: Bearer <token>` and the configured
//! timeout. Any failure (network error, timeout, non-2xx status, non-JSON
//! body) is retried up to `max_retries` more times with a fixed delay in
//! between. Retries are logged at debug level only; callers decide whether a
//! surfaced failure deserves a warning.
//!
//! GET and POST differ once retries are exhausted:
//! - GET returns the last failure.
//! - POST returns the last response body if it parses as JSON, even when the
//!   status was a failure. Tool servers report tool-level errors this way, so
//!   a `Ok(value)` from `post` may describe a server-side error.

use std::time::Duration;

use reqwest::Client as HttpClient;
use reqwest::RequestBuilder;

use super::errors::McpError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// Fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Retries after the first attempt (3 attempts total).
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Maximum bytes of an error body kept in `HttpStatus`.
const MAX_ERROR_BODY: usize = 512;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Timeout and retry budget for tool-server requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// One failed attempt. `body` holds the parsed JSON body of a non-2xx
/// response, if it had one.
#[derive(Debug)]
struct AttemptFailure {
    error: McpError,
    body: Option<serde_json::Value>,
}

/// Stateless bearer-authenticated JSON transport.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    bearer_token: String,
    settings: TransportSettings,
}

impl HttpTransport {
    /// Build a transport with the given credential and settings.
    pub fn new(bearer_token: impl Into<String>, settings: TransportSettings) -> Result<Self, McpError> {
        let http = HttpClient::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| McpError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            bearer_token: bearer_token.into(),
            settings,
        })
    }

    pub fn settings(&self) -> TransportSettings {
        self.settings
    }

    /// `GET url`, returning the JSON body. Fails with the last error once the
    /// retry budget is spent.
    pub async fn get(&self, url: &str) -> Result<serde_json::Value, McpError> {
        let mut attempt = 0;
        loop {
            match self.send(url, self.http.get(url)).await {
                Ok(value) => return Ok(value),
                Err(failure) if attempt < self.settings.max_retries => {
                    attempt += 1;
                    self.log_retry("GET", url, attempt, &failure.error);
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    /// `POST url` with a JSON body.
    ///
    /// After the last failed attempt, a failing response whose body parses as
    /// JSON is returned as `Ok`. Only a final failure with no parseable body
    /// is an error.
    pub async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, McpError> {
        let mut attempt = 0;
        loop {
            match self.send(url, self.http.post(url).json(body)).await {
                Ok(value) => return Ok(value),
                Err(failure) if attempt < self.settings.max_retries => {
                    attempt += 1;
                    self.log_retry("POST", url, attempt, &failure.error);
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(AttemptFailure {
                    body: Some(salvaged),
                    error,
                }) => {
                    tracing::debug!(
                        url = %url,
                        error = %error,
                        "retries exhausted, returning error response body"
                    );
                    return Ok(salvaged);
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    /// Perform a single attempt.
    async fn send(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<serde_json::Value, AttemptFailure> {
        let response = request
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| AttemptFailure {
                error: McpError::TransportError {
                    url: url.to_string(),
                    reason: describe_reqwest_error(&e),
                },
                body: None,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AttemptFailure {
            error: McpError::TransportError {
                url: url.to_string(),
                reason: format!("failed to read response body: {}", describe_reqwest_error(&e)),
            },
            body: None,
        })?;

        if !status.is_success() {
            return Err(AttemptFailure {
                body: serde_json::from_str(&text).ok(),
                error: McpError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body: truncate(&text, MAX_ERROR_BODY),
                },
            });
        }

        serde_json::from_str(&text).map_err(|e| AttemptFailure {
            error: McpError::InvalidResponse {
                url: url.to_string(),
                reason: format!("body is not JSON: {e}"),
            },
            body: None,
        })
    }

    fn log_retry(&self, method: &str, url: &str, attempt: u32, error: &McpError) {
        tracing::debug!(
            method,
            url = %url,
            attempt,
            max_retries = self.settings.max_retries,
            delay_ms = self.settings.retry_delay.as_millis() as u64,
            error = %error,
            "request failed, retrying"
        );
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

/// Truncate to at most `max` bytes on a char boundary.
fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

// ─── Tests ───────────────────────────────────────────────────────────────────
