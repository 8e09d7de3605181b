//! Serve loop: read a message, dispatch it, write the response.
//!
//! Requests are handled one at a time, each to completion, in arrival order.

use tokio::io::{AsyncBufRead, AsyncWrite};

use super::dispatcher::Dispatcher;
use super::errors::McpError;
use super::transport::StdioTransport;
use serde_json::Value;

use super::types::{error_codes, JsonRpcRequest, JsonRpcResponse};

/// Run until the client closes its end of the transport.
///
/// Lines that are not JSON (including lines that are not UTF-8) get a
/// `-32700` response, JSON that is not a request object gets `-32600`, and
/// the loop continues either way. Only transport I/O failures end the loop
/// with an error.
pub async fn serve<R, W>(
    dispatcher: &Dispatcher,
    transport: &mut StdioTransport<R, W>,
) -> Result<(), McpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = transport.read_message().await? {
        let response = match parse_request(&payload) {
            Ok(req) => dispatcher.handle_request(&req).await,
            Err(failure) => Some(failure),
        };

        if let Some(response) = response {
            transport.write_response(&response).await?;
        }
    }

    tracing::info!("client closed stdin, shutting down");
    Ok(())
}

/// Decode one line into a request, or into the error response it deserves.
fn parse_request(payload: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(payload).map_err(|e| {
        tracing::error!(error = %e, "failed to parse JSON-RPC payload");
        JsonRpcResponse::failure(
            Value::Null,
            error_codes::PARSE_ERROR,
            format!("Parse error: {e}"),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(error = %e, "JSON-RPC payload is not a request object");
        JsonRpcResponse::failure(
            id,
            error_codes::INVALID_REQUEST,
            format!("Invalid Request: {e}"),
        )
    })
}
