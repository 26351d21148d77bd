//! Agent Core — orchestration layer for Toolrelay.
//!
//! Submodules:
//! - `prompt`: System prompt synthesis from the discovered tool catalog
//! - `decision`: Interprets a model reply as a turn decision
//! - `session`: Per-turn state machine and the interactive loop
//! - `errors`: Agent-level error types

pub mod decision;
pub mod errors;
pub mod prompt;
pub mod session;

// Re-exports for convenience
pub use decision::{parse_decision, Decision, ToolRequest};
pub use errors::AgentError;
pub use prompt::build_prompt;
pub use session::{is_quit_command, Session, SessionSettings, TurnOutcome};
