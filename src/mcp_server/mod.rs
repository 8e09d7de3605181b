//! MCP Server — JSON-RPC over stdio exposing the `scanFile` tool.
//!
//! This module handles:
//! - Line-delimited JSON-RPC 2.0 framing on stdin/stdout
//! - `initialize`, `tools/list` and `tools/call` handling
//! - Validation of `scanFile` arguments
//! - Turning every tool failure into a `ToolResult { isError: true }`

pub mod dispatcher;
pub mod errors;
pub mod schema;
pub mod server;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use dispatcher::Dispatcher;
pub use errors::{McpError, ToolError};
pub use schema::ScanFileArgs;
pub use server::serve;
pub use transport::StdioTransport;
pub use types::{ContentBlock, JsonRpcRequest, JsonRpcResponse, ToolDescriptor, ToolResult};
