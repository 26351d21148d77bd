//! Session orchestrator — the per-turn control flow.
//!
//! ```text
//! AWAITING_INPUT → DECIDING → DIRECT_REPLY
//!                           → VALIDATING → INVOKING → SUMMARIZING
//!                                        → REJECTED
//!               ← (back to AWAITING_INPUT after every turn)
//! ```
//!
//! The system prompt is built once from the tools discovered at start.
//! Every per-turn failure becomes a `TurnOutcome` and the loop continues;
//! only an explicit `quit`/`exit` (or end of input) ends it.

use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::Instrument;
use uuid::Uuid;

use super::decision::{parse_decision, Decision, ToolRequest};
use super::errors::AgentError;
use super::prompt::build_prompt;
use crate::inference::{ChatModel, ModelConfig};
use crate::mcp_client::{
    validate_args, DiscoveryReport, InvocationOutcome, McpClient, ToolDescriptor,
};

/// Fixed reply when the model reports that no tool fits.
pub const NO_SUITABLE_TOOL_REPLY: &str = "Sorry, no suitable tool.";

// ─── Settings ────────────────────────────────────────────────────────────────

/// Sampling temperatures for the two model calls of a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub decision_temperature: f32,
    pub summary_temperature: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            decision_temperature: 0.0,
            summary_temperature: 0.4,
        }
    }
}

impl From<&ModelConfig> for SessionSettings {
    fn from(config: &ModelConfig) -> Self {
        Self {
            decision_temperature: config.temperature,
            summary_temperature: config.summary_temperature,
        }
    }
}

// ─── Turn Outcome ────────────────────────────────────────────────────────────

/// What a turn produced, ready to present.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Model text shown as-is (prose, bare JSON value, or unknown action).
    Reply(String),
    /// The model found no suitable tool.
    NoSuitableTool,
    /// Tool ran and the model summarized its result.
    ToolAnswered {
        tool: String,
        result: serde_json::Value,
        summary: String,
    },
    /// Tool ran but the summary call failed; the raw result stands in.
    ToolRawResult {
        tool: String,
        result: serde_json::Value,
    },
    /// The turn was rejected or failed.
    Failed(AgentError),
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOutcome::Reply(text) => write!(f, "Assistant: {text}"),
            TurnOutcome::NoSuitableTool => write!(f, "Assistant: {NO_SUITABLE_TOOL_REPLY}"),
            TurnOutcome::ToolAnswered {
                result, summary, ..
            } => {
                writeln!(f, "Tool result: {result}")?;
                write!(f, "Assistant: {summary}")
            }
            TurnOutcome::ToolRawResult { result, .. } => {
                writeln!(f, "Tool result: {result}")?;
                write!(f, "Assistant (raw tool result): {result}")
            }
            TurnOutcome::Failed(err) => write!(f, "[ERROR] {err}"),
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One interactive session: a tool client, a model, and the tool set and
/// prompt fixed at start.
pub struct Session<M: ChatModel> {
    client: McpClient,
    model: M,
    tools: Vec<ToolDescriptor>,
    system_prompt: String,
    settings: SessionSettings,
}

impl<M: ChatModel> Session<M> {
    /// Discover tools and build the system prompt.
    ///
    /// Fails with `NoToolsDiscovered` when no server offers a tool: there is
    /// nothing to orchestrate.
    pub async fn start(
        mut client: McpClient,
        model: M,
        settings: SessionSettings,
    ) -> Result<Self, AgentError> {
        let report = client.discover().await;
        if report.tools.is_empty() {
            return Err(AgentError::NoToolsDiscovered);
        }
        Ok(Self::with_tools(client, model, report.tools, settings))
    }

    /// Build a session over an already-discovered tool set.
    pub fn with_tools(
        client: McpClient,
        model: M,
        tools: Vec<ToolDescriptor>,
        settings: SessionSettings,
    ) -> Self {
        let system_prompt = build_prompt(&tools);
        tracing::info!(
            tools = tools.len(),
            prompt_bytes = system_prompt.len(),
            "system prompt built"
        );
        Self {
            client,
            model,
            tools,
            system_prompt,
            settings,
        }
    }

    /// Re-run discovery and regenerate the system prompt.
    ///
    /// If rediscovery finds no tools, the current tools and prompt are kept
    /// and `NoToolsDiscovered` is returned.
    pub async fn refresh_tools(&mut self) -> Result<DiscoveryReport, AgentError> {
        let report = self.client.discover().await;
        if report.tools.is_empty() {
            return Err(AgentError::NoToolsDiscovered);
        }
        self.tools = report.tools.clone();
        self.system_prompt = build_prompt(&self.tools);
        Ok(report)
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn client(&self) -> &McpClient {
        &self.client
    }

    /// Startup banner listing the available tool names.
    pub fn banner(&self) -> String {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        format!(
            "System prompt built. Available tools: {names:?}\nType 'exit' to quit.\n"
        )
    }

    // ─── Turn Handling ───────────────────────────────────────────────────

    /// Handle one user turn end to end.
    pub async fn handle_turn(&self, user_text: &str) -> TurnOutcome {
        let span = tracing::info_span!("turn", turn_id = %Uuid::new_v4());
        self.run_turn(user_text).instrument(span).await
    }

    async fn run_turn(&self, user_text: &str) -> TurnOutcome {
        // DECIDING
        let reply = match self
            .model
            .complete(
                &self.system_prompt,
                user_text,
                self.settings.decision_temperature,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, transient = e.is_transient(), "decision call failed");
                return TurnOutcome::Failed(AgentError::Model {
                    reason: e.to_string(),
                });
            }
        };

        let decision = parse_decision(&reply);
        tracing::info!(decision = decision.kind(), "model decision");

        let request = match decision {
            Decision::Direct(text) | Decision::Malformed(text) => {
                return TurnOutcome::Reply(text);
            }
            Decision::UnknownAction { action, raw } => {
                tracing::warn!(action = ?action, "model returned unknown action");
                return TurnOutcome::Reply(raw);
            }
            Decision::NoSuitableTool => return TurnOutcome::NoSuitableTool,
            Decision::IncompleteToolRequest(value) => {
                return TurnOutcome::Failed(AgentError::IncompleteToolRequest {
                    request: value.to_string(),
                });
            }
            Decision::UseTool(request) => request,
        };

        let Some(tool) = self.find_tool(&request) else {
            tracing::warn!(tool = %request.tool, server = %request.server, "tool not found");
            return TurnOutcome::Failed(AgentError::ToolNotFound {
                tool: request.tool,
                server: request.server.to_string(),
            });
        };

        // VALIDATING
        if let Some(reason) = validate_args(tool, &request.args) {
            tracing::warn!(tool = %tool.name, reason = %reason, "argument validation failed");
            return TurnOutcome::Failed(AgentError::ArgumentValidation {
                tool: tool.name.clone(),
                reason,
            });
        }

        // INVOKING
        let invocation = self.client.call_tool(tool, request.args).await;
        let result = match invocation.outcome {
            InvocationOutcome::Success(value) => value,
            InvocationOutcome::Failure(reason) => {
                return TurnOutcome::Failed(AgentError::Invocation {
                    tool: tool.name.clone(),
                    reason,
                });
            }
        };

        // SUMMARIZING
        let feedback = summary_request(user_text, &tool.name, &result);
        match self
            .model
            .complete(
                &self.system_prompt,
                &feedback,
                self.settings.summary_temperature,
            )
            .await
        {
            Ok(summary) => TurnOutcome::ToolAnswered {
                tool: tool.name.clone(),
                result,
                summary,
            },
            Err(e) => {
                tracing::warn!(error = %e, "follow-up summary call failed, showing raw result");
                TurnOutcome::ToolRawResult {
                    tool: tool.name.clone(),
                    result,
                }
            }
        }
    }

    /// Exact `(name, server)` lookup among the tools discovered at start.
    fn find_tool(&self, request: &ToolRequest) -> Option<&ToolDescriptor> {
        self.tools
            .iter()
            .find(|t| t.matches(&request.tool, &request.server))
    }

    // ─── REPL ────────────────────────────────────────────────────────────

    /// Read lines from `input` until `quit`/`exit` or end of input, writing
    /// each turn's outcome to `output`.
    pub async fn run<R, W>(&self, mut input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            output.write_all(b"You: ").await?;
            output.flush().await?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            // Invalid UTF-8 is replaced, not fatal.
            let line = String::from_utf8_lossy(&buf);
            let user_text = line.trim();
            if is_quit_command(user_text) {
                break;
            }
            if user_text.is_empty() {
                continue;
            }

            let outcome = self.handle_turn(user_text).await;
            output.write_all(format!("{outcome}\n").as_bytes()).await?;
            output.flush().await?;
        }

        tracing::info!("session ended");
        Ok(())
    }
}

/// `quit` or `exit`, any case.
pub fn is_quit_command(text: &str) -> bool {
    text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit")
}

/// Prompt for the follow-up call that turns a tool result into prose.
fn summary_request(user_text: &str, tool_name: &str, result: &serde_json::Value) -> String {
    format!(
        "User asked: {user_text}\nTool {tool_name} returned: {result}\nProvide a concise reply."
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
