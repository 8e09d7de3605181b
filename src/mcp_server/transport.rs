//! JSON-RPC over stdio transport.
//!
//! Line-delimited JSON: one message per line in each direction. Lines are
//! handed over as raw bytes; decoding (and rejecting bad UTF-8) is the serve
//! loop's job. Generic over the reader and writer so tests can drive it from
//! in-memory buffers.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::errors::McpError;
use super::types::JsonRpcResponse;

/// Bi-directional line transport. Production wires it to stdin/stdout.
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
    line_buf: Vec<u8>,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line_buf: Vec::new(),
        }
    }

    /// Read the next non-blank line, without its line terminator. `None` at
    /// EOF.
    pub async fn read_message(&mut self) -> Result<Option<Vec<u8>>, McpError> {
        loop {
            self.line_buf.clear();
            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.line_buf)
                .await
                .map_err(|e| McpError::TransportError {
                    reason: format!("failed to read from stdin: {e}"),
                })?;

            if bytes_read == 0 {
                return Ok(None);
            }

            let trimmed = self.line_buf.trim_ascii();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_vec()));
            }
        }
    }

    /// Write one response as a single line and flush.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> Result<(), McpError> {
        let mut json = serde_json::to_string(response).map_err(|e| McpError::SerializeError {
            reason: e.to_string(),
        })?;
        json.push('\n');

        self.writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| McpError::TransportError {
                reason: format!("failed to write to stdout: {e}"),
            })?;
        self.writer
            .flush()
            .await
            .map_err(|e| McpError::TransportError {
                reason: format!("failed to flush stdout: {e}"),
            })?;

        Ok(())
    }

    /// Give back the writer (tests inspect what was written).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
