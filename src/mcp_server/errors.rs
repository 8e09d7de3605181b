//! MCP server error types.
//!
//! Two families:
//! - [`ToolError`]: anything that goes wrong inside a tool call. Always
//!   converted into a `ToolResult { isError: true }`, never a JSON-RPC error.
//! - [`McpError`]: protocol and transport faults.

use thiserror::Error;

use crate::mobsf::ScanError;

use super::types::ToolResult;

/// Failures of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The file extension is not `.apk` or `.ipa`.
    #[error("Unsupported file type. Must be .apk or .ipa")]
    UnsupportedFileType,

    /// Arguments did not match the tool's input schema.
    #[error("Invalid input to {tool}")]
    InvalidArguments { tool: String, reason: String },

    /// No tool with this name is registered.
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// Upload, trigger or report fetch failed.
    #[error("MobSF scan failed: {message}")]
    BackendFailure { message: String },

    /// The summary could not be encoded.
    #[error("MobSF scan failed: {reason}")]
    Internal { reason: String },
}

impl From<ScanError> for ToolError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::UnsupportedFileType => ToolError::UnsupportedFileType,
            ScanError::Backend { message } => ToolError::BackendFailure { message },
            encode @ ScanError::Encode { .. } => ToolError::Internal {
                reason: encode.to_string(),
            },
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::error(err.to_string())
    }
}

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum McpError {
    /// Reading from or writing to the transport failed.
    #[error("transport error: {reason}")]
    TransportError { reason: String },

    /// A message could not be serialized for the wire.
    #[error("failed to serialize message: {reason}")]
    SerializeError { reason: String },
}
