//! OpenAI-compatible inference client.
//!
//! Sends a single non-streaming chat completion per call: one system
//! instruction, one user message, and a temperature.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::config::ModelConfig;
use super::errors::InferenceError;
use super::types::{reply_text, ChatCompletionRequest, ChatMessage};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ─── ChatModel ───────────────────────────────────────────────────────────────

/// A text-completion service: system instruction + user message in, reply out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        temperature: f32,
    ) -> Result<String, InferenceError>;
}

// ─── InferenceClient ─────────────────────────────────────────────────────────

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct InferenceClient {
    http: HttpClient,
    config: ModelConfig,
}

impl InferenceClient {
    /// Create a client. Does NOT check connectivity.
    pub fn new(config: ModelConfig) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    /// The configured model name.
    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for InferenceClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        temperature: f32,
    ) -> Result<String, InferenceError> {
        let url = self.completions_url();
        let body = ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_text)],
            temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        // Metadata only; the system prompt is large
        tracing::info!(
            url = %url,
            model = %body.model,
            temperature,
            max_tokens = body.max_tokens,
            "chat completion request"
        );

        let mut request = self.http.post(&url).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout {
                    duration_secs: self.config.timeout_secs,
                }
            } else {
                InferenceError::ConnectionFailed {
                    endpoint: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: serde_json::Value =
            response.json().await.map_err(|e| InferenceError::InvalidResponse {
                reason: format!("failed to parse completion body: {e}"),
            })?;

        Ok(reply_text(&parsed))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
