//! System prompt synthesis from the discovered tool catalog.
//!
//! The prompt fixes the response contract: plain text, a single-line
//! `use_tool` JSON object, or `{"action":"none"}`.

use crate::mcp_client::ToolDescriptor;

/// Exact shape the model must emit to request a tool.
pub const USE_TOOL_SHAPE: &str =
    r#"{"action":"use_tool","tool":"<tool_name>","server_url":"<server_url>","args":{...}}"#;

/// Shape the model must emit when no tool fits.
pub const NO_TOOL_SHAPE: &str = r#"{"action":"none"}"#;

/// Render the instruction document for `tools`.
///
/// Pure function of the tool list. Schemas are rendered as compact JSON with
/// sorted keys.
pub fn build_prompt(tools: &[ToolDescriptor]) -> String {
    let mut lines: Vec<String> = vec![
        "You are an assistant that can call external tools (MCP servers).".into(),
        "You MUST respond in one of two ways:".into(),
        "1) If the user's request can be answered directly, reply in plain text.".into(),
        "2) If you need a tool, reply ONLY with strict JSON in this exact shape:".into(),
        USE_TOOL_SHAPE.into(),
        String::new(),
        "Available tools (name, server, description, args schema):".into(),
    ];

    for tool in tools {
        lines.push(format!("- {}  (server: {})", tool.name, tool.server));
        lines.push(format!("  Description: {}", tool.description));
        lines.push(format!("  Args schema: {}", render_schema(&tool.args_schema)));
        lines.push(format!("  Returns: {}", render_schema(&tool.result_schema)));
        lines.push(String::new());
    }

    lines.push("RULES:".into());
    lines.push("- Return EXACT JSON (no surrounding text) when using a tool.".into());
    lines.push("- Use the provided argument names and types from the schema.".into());
    lines.push(format!(
        "- If you cannot find a suitable tool, return: {NO_TOOL_SHAPE}."
    ));

    lines.join("\n")
}

fn render_schema(schema: &serde_json::Value) -> String {
    // serde_json's default map is ordered by key, so this is stable.
    serde_json::to_string(schema).unwrap_or_else(|_| "{}".to_string())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
