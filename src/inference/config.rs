//! Model endpoint configuration.

use serde::Deserialize;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model name.
pub const DEFAULT_MODEL_NAME: &str = "gpt-4o-mini";

/// Settings for the chat-completion backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model_name: String,
    /// Bearer API key. Empty means no `Authorization` header.
    pub api_key: String,
    /// Temperature for the decision call.
    pub temperature: f32,
    /// Temperature for the follow-up summary call.
    pub summary_temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            api_key: String::new(),
            temperature: 0.0,
            summary_temperature: 0.4,
            max_tokens: 800,
            timeout_secs: 30,
        }
    }
}
