//! Shared fixtures: fake tool servers on loopback and a scripted model.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use toolrelay::inference::{ChatModel, InferenceError};
use toolrelay::mcp_client::{ServerDescriptor, TransportSettings};

// ─── Fake Tool Server ────────────────────────────────────────────────────────

/// Mutable behavior and call counters for one fake server.
pub struct FakeState {
    pub version: Mutex<Value>,
    pub tools: Mutex<Vec<Value>>,
    pub init_status: StatusCode,
    pub init_delay: Duration,
    pub init_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub tool_calls: AtomicUsize,
    pub auth_headers: Mutex<Vec<String>>,
}

impl FakeState {
    pub fn set_catalog(&self, version: Value, tools: Vec<Value>) {
        *self.version.lock().unwrap() = version;
        *self.tools.lock().unwrap() = tools;
    }

    pub fn tool_calls(&self) -> usize {
        self.tool_calls.load(Ordering::SeqCst)
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

/// A running fake server.
pub struct FakeServer {
    pub url: String,
    pub state: Arc<FakeState>,
}

impl FakeServer {
    pub fn descriptor(&self) -> ServerDescriptor {
        ServerDescriptor::new(&self.url)
    }
}

/// Builder for fake servers.
pub struct FakeServerBuilder {
    version: Value,
    tools: Vec<Value>,
    init_status: StatusCode,
    init_delay: Duration,
}

impl FakeServerBuilder {
    pub fn new() -> Self {
        Self {
            version: json!("1"),
            tools: Vec::new(),
            init_status: StatusCode::OK,
            init_delay: Duration::ZERO,
        }
    }

    pub fn version(mut self, version: Value) -> Self {
        self.version = version;
        self
    }

    pub fn tool(mut self, tool: Value) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn init_status(mut self, status: StatusCode) -> Self {
        self.init_status = status;
        self
    }

    pub fn init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    pub async fn spawn(self) -> FakeServer {
        let state = Arc::new(FakeState {
            version: Mutex::new(self.version),
            tools: Mutex::new(self.tools),
            init_status: self.init_status,
            init_delay: self.init_delay,
            init_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            tool_calls: AtomicUsize::new(0),
            auth_headers: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/initialize", get(initialize))
            .route("/list_tools", get(list_tools))
            .route("/call_tool", post(call_tool))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeServer {
            url: format!("http://{addr}"),
            state,
        }
    }
}

async fn initialize(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.init_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(auth) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        state.auth_headers.lock().unwrap().push(auth.to_string());
    }
    if !state.init_delay.is_zero() {
        tokio::time::sleep(state.init_delay).await;
    }
    (state.init_status, Json(json!({"status": "ok"})))
}

async fn list_tools(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let version = state.version.lock().unwrap().clone();
    let tools = state.tools.lock().unwrap().clone();
    Json(json!({"tool_schema_version": version, "tools": tools}))
}

/// `add_numbers` adds; `explode` fails with a JSON error body; `crash` fails
/// with a plain-text body; anything else is unknown.
async fn call_tool(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> Response {
    state.tool_calls.fetch_add(1, Ordering::SeqCst);
    let args = &body["args"];
    match body["tool"].as_str() {
        Some("add_numbers") => {
            let a = args["a"].as_f64().unwrap_or_default();
            let b = args["b"].as_f64().unwrap_or_default();
            let sum = a + b;
            let result = if sum.fract() == 0.0 {
                json!(sum as i64)
            } else {
                json!(sum)
            };
            (StatusCode::OK, Json(json!({"result": result}))).into_response()
        }
        Some("explode") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "tool exploded"})),
        )
            .into_response(),
        Some("crash") => (StatusCode::INTERNAL_SERVER_ERROR, "internal failure").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "unknown tool"})),
        )
            .into_response(),
    }
}

/// Catalog entry for `add_numbers(a: number, b: number)`.
pub fn add_numbers_tool() -> Value {
    json!({
        "name": "add_numbers",
        "description": "Add two numbers",
        "args_schema": {
            "type": "object",
            "properties": {"a": {"type": "number"}, "b": {"type": "number"}},
            "required": ["a", "b"]
        },
        "result_schema": {"type": "object", "properties": {"result": {"type": "number"}}}
    })
}

/// Catalog entry for `echo(text: string)`.
pub fn echo_tool() -> Value {
    json!({
        "name": "echo",
        "description": "Echo text back",
        "args_schema": {
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        }
    })
}

/// A loopback URL with nothing listening on it.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Short timeouts so failure paths finish quickly.
pub fn fast_settings() -> TransportSettings {
    TransportSettings {
        timeout: Duration::from_millis(300),
        max_retries: 2,
        retry_delay: Duration::from_millis(10),
    }
}

// ─── Scripted Model ──────────────────────────────────────────────────────────

/// A recorded model call.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub system_prompt: String,
    pub user_text: String,
    pub temperature: f32,
}

/// Replays canned replies in order and records every call.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, InferenceError>>>,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        temperature: f32,
    ) -> Result<String, InferenceError> {
        self.calls.lock().unwrap().push(ModelCall {
            system_prompt: system_prompt.to_string(),
            user_text: user_text.to_string(),
            temperature,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::InvalidResponse {
                reason: "script exhausted".into(),
            }))
    }
}
