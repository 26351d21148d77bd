//! Application configuration loading and validation.
//!
//! Reads `toolrelay.yaml` and resolves environment variables. A missing file
//! is not an error; built-in defaults match a local two-server setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::inference::ModelConfig;
use crate::mcp_client::transport::{
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_DELAY,
};
use crate::mcp_client::{ServerDescriptor, TransportSettings};

/// Config file name searched for on disk.
pub const CONFIG_FILE_NAME: &str = "toolrelay.yaml";
/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TOOLRELAY_CONFIG";
/// Env var supplying the tool-server bearer token.
pub const BEARER_TOKEN_ENV: &str = "MCP_BEARER_TOKEN";
/// Env var supplying the model API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Token used when neither the file nor the environment provides one.
pub const DEFAULT_BEARER_TOKEN: &str = "super-secret-token";

/// Upper bound on configured retries.
const MAX_RETRIES_LIMIT: u32 = 10;

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

// ─── Public Types ────────────────────────────────────────────────────────────

/// Transport section, in file units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

/// Top-level configuration (mirrors `toolrelay.yaml`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Tool server base URLs, in discovery order.
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,
    #[serde(default = "default_bearer_token")]
    pub bearer_token: String,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_servers() -> Vec<String> {
    vec![
        "http://localhost:8000".to_string(),
        "http://localhost:8001".to_string(),
    ]
}

fn default_bearer_token() -> String {
    std::env::var(BEARER_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_BEARER_TOKEN.to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut config = Self {
            servers: default_servers(),
            bearer_token: default_bearer_token(),
            transport: TransportConfig::default(),
            model: ModelConfig::default(),
        };
        config.apply_env_fallbacks();
        config
    }
}

impl AppConfig {
    /// Parse YAML text after env interpolation, then validate.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(raw);
        let mut config: AppConfig = if interpolated.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
                reason: e.to_string(),
            })?
        };
        config.apply_env_fallbacks();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Fill values the file left empty from the environment.
    fn apply_env_fallbacks(&mut self) {
        if self.model.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.model.api_key = key;
            }
        }
    }

    /// Strip trailing `/` so server identity compares exactly.
    fn normalize(&mut self) {
        for server in &mut self.servers {
            let trimmed = server.trim().trim_end_matches('/').to_string();
            *server = trimmed;
        }
    }

    /// Check the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "at least one server must be configured".into(),
            });
        }
        for server in &self.servers {
            let rest = server
                .strip_prefix("http://")
                .or_else(|| server.strip_prefix("https://"));
            if rest.map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid {
                    reason: format!("server '{server}' is not an http(s) URL"),
                });
            }
        }
        if self.transport.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "transport.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                    self.transport.max_retries
                ),
            });
        }
        if self.transport.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "transport.timeout_secs must be positive".into(),
            });
        }
        Ok(())
    }

    /// Configured servers as descriptors, in order.
    pub fn server_descriptors(&self) -> Vec<ServerDescriptor> {
        self.servers.iter().map(ServerDescriptor::new).collect()
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            timeout: Duration::from_secs(self.transport.timeout_secs),
            max_retries: self.transport.max_retries,
            retry_delay: Duration::from_millis(self.transport.retry_delay_ms),
        }
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the config file.
///
/// Checks `TOOLRELAY_CONFIG`, then walks upward from `start`, then falls back
/// to the data directory. Returns `None` if no file exists.
pub fn find_config_path(start: &Path) -> Option<PathBuf> {
    // 1. Check env var
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let candidate = PathBuf::from(expand_tilde(&path));
        if candidate.exists() {
            return Some(candidate);
        }
        tracing::warn!(path = %candidate.display(), "{CONFIG_PATH_ENV} points to a missing file");
    }

    // 2. Walk upward from `start`
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    // 3. Data directory
    let candidate = crate::data_dir().join(CONFIG_FILE_NAME);
    candidate.exists().then_some(candidate)
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    AppConfig::from_yaml(&raw)
}

/// Load the config found from `start`, or defaults if there is none.
pub fn load_or_default(start: &Path) -> Result<AppConfig, ConfigError> {
    match find_config_path(start) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            load_config(&path)
        }
        None => {
            tracing::info!("no config file found, using defaults");
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve `VAR` or `VAR:-default`. Unset or empty uses the default.
fn resolve_var_expr(expr: &str) -> String {
    match expr.split_once(":-") {
        Some((name, default)) => std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| expand_tilde(default)),
        None => std::env::var(expr).unwrap_or_default(),
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars_with_default() {
        std::env::remove_var("__TOOLRELAY_TEST_UNSET__");
        let result = interpolate_env_vars("${__TOOLRELAY_TEST_UNSET__:-fallback}");
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_interpolate_env_vars_with_value() {
        std::env::set_var("__TOOLRELAY_TEST_TOKEN__", "from-env");
        let result = interpolate_env_vars("token: ${__TOOLRELAY_TEST_TOKEN__:-fallback}");
        assert_eq!(result, "token: from-env");
        std::env::remove_var("__TOOLRELAY_TEST_TOKEN__");
    }

    #[test]
    fn test_interpolate_no_vars() {
        let input = "plain text with $ but no braces";
        assert_eq!(interpolate_env_vars(input), input);
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand_tilde("~/logs");
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("/logs"));
        assert_eq!(expand_tilde("/abs/path"), "/abs/path");
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
servers:
  - "http://tools-a:9000/"
  - "https://tools-b.example.com"
bearer_token: "abc"
transport:
  timeout_secs: 3
  max_retries: 1
  retry_delay_ms: 100
model:
  model_name: "llama3.1"
  base_url: "http://localhost:11434/v1"
  api_key: "k"
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.server_descriptors(),
            vec![
                ServerDescriptor::new("http://tools-a:9000"),
                ServerDescriptor::new("https://tools-b.example.com"),
            ]
        );
        assert_eq!(config.servers[0], "http://tools-a:9000");
        assert_eq!(config.bearer_token, "abc");
        assert_eq!(
            config.transport_settings(),
            TransportSettings {
                timeout: Duration::from_secs(3),
                max_retries: 1,
                retry_delay: Duration::from_millis(100),
            }
        );
        assert_eq!(config.model.model_name, "llama3.1");
        assert_eq!(config.model.max_tokens, 800);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = AppConfig::from_yaml("bearer_token: \"abc\"\n").unwrap();
        assert_eq!(config.servers, default_servers());
        assert_eq!(config.transport, TransportConfig::default());
        assert_eq!(config.transport_settings(), TransportSettings::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.servers.len(), 2);
    }

    #[test]
    fn test_empty_server_list_rejected() {
        let err = AppConfig::from_yaml("servers: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_non_http_server_rejected() {
        let err = AppConfig::from_yaml("servers: [\"localhost:8000\"]\n").unwrap_err();
        assert!(err.to_string().contains("not an http(s) URL"));
    }

    #[test]
    fn test_excessive_retries_rejected() {
        let err = AppConfig::from_yaml("transport:\n  max_retries: 11\n").unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let err = AppConfig::from_yaml("servers: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "servers: [\"http://127.0.0.1:7000\"]\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.servers, vec!["http://127.0.0.1:7000".to_string()]);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_find_config_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "servers: [\"http://127.0.0.1:7000\"]\n").unwrap();

        // Only meaningful when TOOLRELAY_CONFIG is not set in the test env.
        if std::env::var(CONFIG_PATH_ENV).is_err() {
            assert_eq!(find_config_path(&nested), Some(path));
        }
    }
}
