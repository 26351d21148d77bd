//! Tool registry — per-server catalog cache and discovery.
//!
//! Provides:
//! - Discovery across all configured servers, tolerating unreachable ones
//! - A per-server cache keyed by server identity, reused while the server
//!   reports the same `tool_schema_version`
//! - Wholesale replacement of a server's entry when its version changes

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::McpError;
use super::transport::HttpTransport;
use super::types::{
    CacheEntry, ListToolsResponse, ServerDescriptor, ToolDefinition, ToolDescriptor,
    INITIALIZE_PATH, LIST_TOOLS_PATH,
};

// ─── Discovery Report ────────────────────────────────────────────────────────

/// Which step of discovery a server failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStage {
    /// `GET /initialize` failed.
    Initialize,
    /// `GET /list_tools` failed or returned an unusable body.
    ListTools,
}

impl fmt::Display for DiscoveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStage::Initialize => f.write_str("initialize"),
            DiscoveryStage::ListTools => f.write_str("list_tools"),
        }
    }
}

/// A server skipped during a discovery pass.
#[derive(Debug)]
pub struct UnreachableServer {
    pub server: ServerDescriptor,
    pub stage: DiscoveryStage,
    pub error: McpError,
}

/// Result of one discovery pass.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Tools from every reachable server, in configured server order.
    pub tools: Vec<ToolDescriptor>,
    /// Per reachable server, the cache entry's tool list. When a server's
    /// version is unchanged this is the same allocation as the previous pass.
    pub catalogs: Vec<(ServerDescriptor, Arc<[ToolDescriptor]>)>,
    /// Servers skipped this pass. Non-empty means partial failure.
    pub unreachable: Vec<UnreachableServer>,
}

impl DiscoveryReport {
    pub fn is_partial(&self) -> bool {
        !self.unreachable.is_empty()
    }
}

// ─── ToolRegistry ────────────────────────────────────────────────────────────

/// Session-scoped tool catalog cache.
///
/// One entry per server. An entry is only reused while the server reports
/// the same schema version; any other version replaces it whole.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    cache: HashMap<ServerDescriptor, CacheEntry>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover tools from `servers`, returning whatever is reachable.
    ///
    /// Never fails: unreachable servers are logged and skipped, so the result
    /// may be empty. The returned descriptors are copies; allocation identity
    /// across passes holds for the cached lists (see
    /// [`DiscoveryReport::catalogs`]).
    pub async fn discover(
        &mut self,
        transport: &HttpTransport,
        servers: &[ServerDescriptor],
    ) -> Vec<ToolDescriptor> {
        self.discover_with_report(transport, servers).await.tools
    }

    /// Discover tools and report which servers were skipped.
    ///
    /// Servers are probed concurrently, one task each, and joined in listed
    /// order. Cache updates are then applied one server at a time, so each
    /// entry is swapped in whole.
    pub async fn discover_with_report(
        &mut self,
        transport: &HttpTransport,
        servers: &[ServerDescriptor],
    ) -> DiscoveryReport {
        let mut handles = Vec::with_capacity(servers.len());
        for server in servers {
            let transport = transport.clone();
            let server = server.clone();
            handles.push(tokio::spawn(async move {
                fetch_catalog(&transport, &server).await
            }));
        }

        let fetched = futures::future::join_all(handles).await;

        let mut report = DiscoveryReport::default();
        for (server, joined) in servers.iter().zip(fetched) {
            let result = joined.unwrap_or_else(|e| {
                Err((
                    DiscoveryStage::ListTools,
                    McpError::TransportError {
                        url: server.to_string(),
                        reason: format!("join error: {e}"),
                    },
                ))
            });

            match result {
                Ok(catalog) => {
                    let tools =
                        self.apply_catalog(server, catalog.tool_schema_version, catalog.tools);
                    report.tools.extend(tools.iter().cloned());
                    report.catalogs.push((server.clone(), tools));
                }
                Err((stage, error)) => {
                    tracing::warn!(
                        server = %server,
                        stage = %stage,
                        error = %error,
                        "tool server unavailable, skipping for this discovery pass"
                    );
                    report.unreachable.push(UnreachableServer {
                        server: server.clone(),
                        stage,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            servers = servers.len(),
            unreachable = report.unreachable.len(),
            tools = report.tools.len(),
            "tool discovery complete"
        );

        report
    }

    /// Merge a freshly fetched catalog into the cache and return the tools to
    /// use for this server.
    ///
    /// Same version as the cached entry: the fetched list is discarded and the
    /// cached one returned unchanged. Otherwise the entry is replaced.
    pub fn apply_catalog(
        &mut self,
        server: &ServerDescriptor,
        schema_version: serde_json::Value,
        fetched: Vec<ToolDefinition>,
    ) -> Arc<[ToolDescriptor]> {
        if let Some(entry) = self.cache.get(server) {
            if entry.schema_version == schema_version {
                tracing::info!(
                    server = %server,
                    version = %schema_version,
                    tools = entry.tools.len(),
                    "using cached tools"
                );
                return Arc::clone(&entry.tools);
            }
        }

        let tools: Arc<[ToolDescriptor]> = fetched
            .into_iter()
            .map(|def| ToolDescriptor::from_definition(def, server))
            .collect();

        tracing::info!(
            server = %server,
            version = %schema_version,
            tools = tools.len(),
            "cached tools"
        );

        self.cache.insert(
            server.clone(),
            CacheEntry {
                server: server.clone(),
                schema_version,
                tools: Arc::clone(&tools),
            },
        );

        tools
    }

    /// The cached entry for a server, if any.
    pub fn cached(&self, server: &ServerDescriptor) -> Option<&CacheEntry> {
        self.cache.get(server)
    }

    /// Drop a server's cached entry.
    pub fn invalidate(&mut self, server: &ServerDescriptor) {
        self.cache.remove(server);
    }

    /// Number of servers with a cached entry.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no server has a cached entry.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Probe a server and fetch its catalog.
async fn fetch_catalog(
    transport: &HttpTransport,
    server: &ServerDescriptor,
) -> Result<ListToolsResponse, (DiscoveryStage, McpError)> {
    transport
        .get(&server.endpoint(INITIALIZE_PATH))
        .await
        .map_err(|e| (DiscoveryStage::Initialize, e))?;

    let url = server.endpoint(LIST_TOOLS_PATH);
    let body = transport
        .get(&url)
        .await
        .map_err(|e| (DiscoveryStage::ListTools, e))?;

    serde_json::from_value(body).map_err(|e| {
        (
            DiscoveryStage::ListTools,
            McpError::InvalidResponse {
                url,
                reason: format!("malformed tool catalog: {e}"),
            },
        )
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
