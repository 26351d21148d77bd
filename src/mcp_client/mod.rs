//! Tool-server client — discovery, caching, validation, and invocation.
//!
//! This module handles:
//! - Bearer-authenticated HTTP with bounded retry (`transport`)
//! - Catalog discovery with schema-version caching (`registry`)
//! - JSON Schema validation of tool arguments (`validation`)
//! - Tool invocation over `POST /call_tool` (`client`)
//!
//! Servers expose three endpoints: `GET /initialize`, `GET /list_tools`,
//! and `POST /call_tool`.

pub mod client;
pub mod errors;
pub mod registry;
pub mod transport;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use client::McpClient;
pub use errors::McpError;
pub use registry::{DiscoveryReport, DiscoveryStage, ToolRegistry, UnreachableServer};
pub use transport::{HttpTransport, TransportSettings};
pub use types::{
    CacheEntry, InvocationOutcome, ServerDescriptor, ToolDefinition, ToolDescriptor,
    ToolInvocationResult,
};
pub use validation::validate_args;
