//! Decision parsing — interprets a model reply for the current turn.
//!
//! The whole reply is parsed as strict JSON. Anything that is not JSON is
//! prose and comes back as `Malformed`; that is a normal outcome, not an
//! error. JSON objects are dispatched on their `action` field.

use serde_json::Value;

use crate::mcp_client::ServerDescriptor;

/// A complete `use_tool` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    pub tool: String,
    pub server: ServerDescriptor,
    /// Defaults to `{}` when the model omits `args` or sends `null`.
    pub args: Value,
}

/// The model's decision for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Valid JSON that is not an object (a bare string, number, ...).
    Direct(String),
    /// `{"action":"use_tool", ...}` with both `tool` and `server_url`.
    UseTool(ToolRequest),
    /// `{"action":"use_tool", ...}` missing `tool` or `server_url`.
    IncompleteToolRequest(Value),
    /// `{"action":"none"}`.
    NoSuitableTool,
    /// A JSON object whose `action` is absent or unrecognized.
    UnknownAction { action: Option<String>, raw: String },
    /// Not JSON at all: the model answered in prose.
    Malformed(String),
}

impl Decision {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Direct(_) => "direct",
            Decision::UseTool(_) => "use_tool",
            Decision::IncompleteToolRequest(_) => "incomplete_tool_request",
            Decision::NoSuitableTool => "none",
            Decision::UnknownAction { .. } => "unknown_action",
            Decision::Malformed(_) => "malformed",
        }
    }
}

/// Parse a raw model reply into a `Decision`.
pub fn parse_decision(raw: &str) -> Decision {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return Decision::Malformed(raw.to_string()),
    };

    let obj = match value {
        Value::Object(ref obj) => obj,
        _ => return Decision::Direct(raw.trim().to_string()),
    };

    match obj.get("action").and_then(Value::as_str) {
        Some("none") => Decision::NoSuitableTool,
        Some("use_tool") => {
            let tool = non_empty_str(obj.get("tool"));
            let server_url = non_empty_str(obj.get("server_url"));
            match (tool, server_url) {
                (Some(tool), Some(server_url)) => {
                    let args = match obj.get("args") {
                        None | Some(Value::Null) => Value::Object(Default::default()),
                        Some(args) => args.clone(),
                    };
                    Decision::UseTool(ToolRequest {
                        tool: tool.to_string(),
                        server: ServerDescriptor::new(server_url),
                        args,
                    })
                }
                _ => Decision::IncompleteToolRequest(value.clone()),
            }
        }
        other => Decision::UnknownAction {
            action: other.map(String::from),
            raw: raw.to_string(),
        },
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prose_is_malformed() {
        let raw = "The capital of France is Paris.";
        assert_eq!(parse_decision(raw), Decision::Malformed(raw.to_string()));
    }

    #[test]
    fn test_broken_json_is_malformed() {
        let raw = r#"{"action":"use_tool","tool":"add_numbers""#;
        assert_eq!(parse_decision(raw), Decision::Malformed(raw.to_string()));
    }

    #[test]
    fn test_json_with_surrounding_text_is_malformed() {
        let raw = r#"Sure! {"action":"none"}"#;
        assert!(matches!(parse_decision(raw), Decision::Malformed(_)));
    }

    #[test]
    fn test_non_object_json_is_direct() {
        assert_eq!(parse_decision("42"), Decision::Direct("42".into()));
        assert_eq!(
            parse_decision("  \"Paris\" "),
            Decision::Direct("\"Paris\"".into())
        );
    }

    #[test]
    fn test_action_none() {
        assert_eq!(parse_decision(r#"{"action":"none"}"#), Decision::NoSuitableTool);
    }

    #[test]
    fn test_use_tool_complete() {
        let raw = r#"{"action":"use_tool","tool":"add_numbers","server_url":"http://localhost:8001","args":{"a":2,"b":3}}"#;
        match parse_decision(raw) {
            Decision::UseTool(req) => {
                assert_eq!(req.tool, "add_numbers");
                assert_eq!(req.server, ServerDescriptor::new("http://localhost:8001"));
                assert_eq!(req.args, json!({"a": 2, "b": 3}));
            }
            other => panic!("expected UseTool, got {other:?}"),
        }
    }

    #[test]
    fn test_use_tool_args_default_to_empty_object() {
        let raw = r#"{"action":"use_tool","tool":"get_time","server_url":"http://localhost:8000"}"#;
        match parse_decision(raw) {
            Decision::UseTool(req) => assert_eq!(req.args, json!({})),
            other => panic!("expected UseTool, got {other:?}"),
        }

        let raw = r#"{"action":"use_tool","tool":"get_time","server_url":"http://localhost:8000","args":null}"#;
        match parse_decision(raw) {
            Decision::UseTool(req) => assert_eq!(req.args, json!({})),
            other => panic!("expected UseTool, got {other:?}"),
        }
    }

    #[test]
    fn test_use_tool_missing_fields_is_incomplete() {
        let raw = r#"{"action":"use_tool","tool":"add_numbers"}"#;
        assert_eq!(
            parse_decision(raw),
            Decision::IncompleteToolRequest(json!({"action": "use_tool", "tool": "add_numbers"}))
        );

        let raw = r#"{"action":"use_tool","tool":"","server_url":"http://localhost:8001"}"#;
        assert!(matches!(
            parse_decision(raw),
            Decision::IncompleteToolRequest(_)
        ));
    }

    #[test]
    fn test_unknown_action() {
        let raw = r#"{"action":"dance"}"#;
        assert_eq!(
            parse_decision(raw),
            Decision::UnknownAction {
                action: Some("dance".into()),
                raw: raw.into()
            }
        );

        let raw = r#"{"answer": 5}"#;
        assert_eq!(
            parse_decision(raw),
            Decision::UnknownAction {
                action: None,
                raw: raw.into()
            }
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Decision::NoSuitableTool.kind(), "none");
        assert_eq!(Decision::Malformed("x".into()).kind(), "malformed");
    }
}
