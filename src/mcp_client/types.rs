//! Shared types for the tool-server client.
//!
//! Wire structures for the three-endpoint tool protocol plus the in-process
//! descriptors the registry hands out.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ─── Endpoints ───────────────────────────────────────────────────────────────

/// Liveness/readiness probe.
pub const INITIALIZE_PATH: &str = "/initialize";
/// Tool catalog with schema version.
pub const LIST_TOOLS_PATH: &str = "/list_tools";
/// Tool invocation.
pub const CALL_TOOL_PATH: &str = "/call_tool";

// ─── Server Identity ─────────────────────────────────────────────────────────

/// Identity of a tool server: its base address.
///
/// Two descriptors are the same server iff their normalized base URLs are
/// equal. A trailing `/` is dropped so `http://h:1/` and `http://h:1` match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerDescriptor {
    base_url: String,
}

impl ServerDescriptor {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into().trim().to_string();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path on this server.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

// ─── Wire Types ──────────────────────────────────────────────────────────────

/// A tool as listed by `GET /list_tools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_args_schema")]
    pub args_schema: serde_json::Value,
    #[serde(default = "empty_schema")]
    pub result_schema: serde_json::Value,
}

fn default_args_schema() -> serde_json::Value {
    serde_json::json!({ "type": "object" })
}

fn empty_schema() -> serde_json::Value {
    serde_json::json!({})
}

/// Body of `GET /list_tools`.
///
/// `tool_schema_version` is opaque: any JSON value, compared by equality.
/// A server that omits it reports `null`, which still compares equal to a
/// previous `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsResponse {
    #[serde(default)]
    pub tool_schema_version: serde_json::Value,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// A discovered tool tagged with the server that owns it.
///
/// `(name, server)` identifies a tool; the same name may exist on several
/// servers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub args_schema: serde_json::Value,
    pub result_schema: serde_json::Value,
    pub server: ServerDescriptor,
}

impl ToolDescriptor {
    pub fn from_definition(def: ToolDefinition, server: &ServerDescriptor) -> Self {
        Self {
            name: def.name,
            description: def.description,
            args_schema: def.args_schema,
            result_schema: def.result_schema,
            server: server.clone(),
        }
    }

    /// Whether this tool is `name` on `server`.
    pub fn matches(&self, name: &str, server: &ServerDescriptor) -> bool {
        self.name == name && &self.server == server
    }
}

/// Cached catalog for one server. Replaced wholesale, never edited.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub server: ServerDescriptor,
    pub schema_version: serde_json::Value,
    pub tools: Arc<[ToolDescriptor]>,
}

/// Outcome of a single tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    Success(serde_json::Value),
    Failure(String),
}

/// A tool invocation and what came back from it.
#[derive(Debug, Clone)]
pub struct ToolInvocationResult {
    pub tool: ToolDescriptor,
    pub args: serde_json::Value,
    pub outcome: InvocationOutcome,
    pub execution_time_ms: u64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
