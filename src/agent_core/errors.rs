//! Agent Core error types.
//!
//! Every per-turn failure is one of these. The session reports them and keeps
//! going; only `NoToolsDiscovered` at startup ends a session.

use thiserror::Error;

/// Errors that can occur while handling a turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The decision model call itself failed.
    #[error("LLM call failed: {reason}")]
    Model { reason: String },

    /// `use_tool` decision without a tool name or server.
    #[error("Incomplete tool call info: {request}")]
    IncompleteToolRequest { request: String },

    /// No discovered tool matches the requested `(tool, server)` pair.
    #[error("Tool '{tool}' not found on server '{server}'.")]
    ToolNotFound { tool: String, server: String },

    /// Requested arguments violate the tool's argument schema.
    #[error("Argument validation failed: {reason}")]
    ArgumentValidation { tool: String, reason: String },

    /// The tool call failed after validation passed.
    #[error("Tool call failed: {reason}")]
    Invocation { tool: String, reason: String },

    /// No server offered any tool at session start.
    #[error("No tools discovered.")]
    NoToolsDiscovered,
}

impl AgentError {
    /// Whether this error ends the session rather than just the turn.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::NoToolsDiscovered)
    }
}
