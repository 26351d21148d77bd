//! Inference Client — OpenAI-compatible API client for the language model.
//!
//! The orchestrator only needs one operation: send a system instruction and a
//! user message with a temperature, get one text reply back. That contract is
//! the `ChatModel` trait; `InferenceClient` implements it over HTTP.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-exports for convenience
pub use client::{ChatModel, InferenceClient};
pub use config::ModelConfig;
pub use errors::InferenceError;
pub use types::{ChatMessage, Role};
