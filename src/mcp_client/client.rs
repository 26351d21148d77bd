//! Tool-server client — high-level interface for discovery and invocation.
//!
//! Owns the transport, the configured server list, and the session's tool
//! registry. This is the API the session orchestrator drives.

use std::time::Instant;

use super::errors::McpError;
use super::registry::{DiscoveryReport, ToolRegistry};
use super::transport::{HttpTransport, TransportSettings};
use super::types::{
    InvocationOutcome, ServerDescriptor, ToolDescriptor, ToolInvocationResult,
    CALL_TOOL_PATH,
};

// ─── McpClient ───────────────────────────────────────────────────────────────

/// Client for a fixed set of tool servers.
pub struct McpClient {
    /// Authenticated transport shared by every request.
    transport: HttpTransport,
    /// Servers in configured order.
    servers: Vec<ServerDescriptor>,
    /// Catalog cache, scoped to this client.
    pub registry: ToolRegistry,
}

impl McpClient {
    /// Create a client for `servers`. Does not contact them.
    pub fn new(
        servers: Vec<ServerDescriptor>,
        bearer_token: impl Into<String>,
        settings: TransportSettings,
    ) -> Result<Self, McpError> {
        Ok(Self {
            transport: HttpTransport::new(bearer_token, settings)?,
            servers,
            registry: ToolRegistry::new(),
        })
    }

    /// Create a client around an existing transport.
    pub fn with_transport(servers: Vec<ServerDescriptor>, transport: HttpTransport) -> Self {
        Self {
            transport,
            servers,
            registry: ToolRegistry::new(),
        }
    }

    // ─── Discovery ───────────────────────────────────────────────────────

    /// Discover tools from every configured server.
    pub async fn discover(&mut self) -> DiscoveryReport {
        self.registry
            .discover_with_report(&self.transport, &self.servers)
            .await
    }

    // ─── Invocation ──────────────────────────────────────────────────────

    /// `POST /call_tool` on `server` with `{tool, args}`.
    ///
    /// No schema validation happens here; callers validate first. Because
    /// the transport salvages error bodies, an `Ok` value may carry a
    /// server-reported error.
    pub async fn invoke(
        &self,
        server: &ServerDescriptor,
        tool_name: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, McpError> {
        let body = call_tool_body(tool_name, args);

        tracing::info!(server = %server, tool = tool_name, "calling tool");

        self.transport
            .post(&server.endpoint(CALL_TOOL_PATH), &body)
            .await
    }

    /// Invoke a discovered tool and record the outcome with timing.
    pub async fn call_tool(
        &self,
        tool: &ToolDescriptor,
        args: serde_json::Value,
    ) -> ToolInvocationResult {
        let start = Instant::now();
        let outcome = match self.invoke(&tool.server, &tool.name, &args).await {
            Ok(value) => InvocationOutcome::Success(value),
            Err(e) => InvocationOutcome::Failure(e.to_string()),
        };
        let execution_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            server = %tool.server,
            tool = %tool.name,
            success = matches!(outcome, InvocationOutcome::Success(_)),
            execution_time_ms,
            "tool call finished"
        );

        ToolInvocationResult {
            tool: tool.clone(),
            args,
            outcome,
            execution_time_ms,
        }
    }

    // ─── Status ──────────────────────────────────────────────────────────

    /// Configured servers in order.
    pub fn servers(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    /// The transport settings in effect.
    pub fn transport_settings(&self) -> TransportSettings {
        self.transport.settings()
    }
}

/// Body of `POST /call_tool`.
fn call_tool_body(tool_name: &str, args: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "tool": tool_name, "args": args })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
