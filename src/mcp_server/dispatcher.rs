//! Request dispatcher.
//!
//! Three MCP handlers — `initialize`, `tools/list`, `tools/call` — plus the
//! JSON-RPC routing around them. Tool-level failures come back as
//! `ToolResult { isError: true }`; only protocol faults (unknown method,
//! malformed params) become JSON-RPC errors.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::logging::DiagnosticLog;
use crate::mobsf::ScanOrchestrator;

use super::errors::ToolError;
use super::schema::{scan_file_input_schema, ScanFileArgs, SCAN_FILE_DESCRIPTION, SCAN_FILE_TOOL};
use super::types::{
    error_codes, InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerInfo, ToolDescriptor,
    ToolResult, INSTRUCTIONS, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION,
};

/// Routes MCP requests to the scan orchestrator.
///
/// Stateless apart from the static tool catalog.
pub struct Dispatcher {
    orchestrator: ScanOrchestrator,
    log: Arc<dyn DiagnosticLog>,
}

impl Dispatcher {
    pub fn new(orchestrator: ScanOrchestrator, log: Arc<dyn DiagnosticLog>) -> Self {
        Self { orchestrator, log }
    }

    // ─── MCP handlers ────────────────────────────────────────────────────

    /// `initialize`: protocol version, capabilities, identity, instructions.
    pub fn initialize(&self) -> InitializeResult {
        self.log.append("Received initialize request");
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({ "tools": { "listChanged": true } }),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: INSTRUCTIONS.to_string(),
        }
    }

    /// `tools/list`: the single `scanFile` tool.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.log.append("Received list tools request");
        vec![ToolDescriptor {
            name: SCAN_FILE_TOOL.to_string(),
            description: SCAN_FILE_DESCRIPTION.to_string(),
            input_schema: scan_file_input_schema(),
        }]
    }

    /// `tools/call`. Never fails; errors are carried in the result.
    pub async fn call_tool(&self, name: &str, arguments: Option<&Value>) -> ToolResult {
        self.log.append(&format!("Tool call received: {name}"));

        if name != SCAN_FILE_TOOL {
            return ToolError::UnknownTool {
                name: name.to_string(),
            }
            .into();
        }

        match ScanFileArgs::validate(arguments) {
            Ok(args) => match self.orchestrator.scan_file(&args.file).await {
                Ok(text) => ToolResult::success(text),
                Err(e) => ToolError::from(e).into(),
            },
            Err(e) => {
                if let ToolError::InvalidArguments { reason, .. } = &e {
                    tracing::warn!(tool = name, reason = %reason, "rejected tool arguments");
                }
                e.into()
            }
        }
    }

    // ─── JSON-RPC routing ────────────────────────────────────────────────

    /// Handle one JSON-RPC message. Notifications get no response.
    pub async fn handle_request(&self, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %req.method, id = ?req.id, "request received");

        if req.is_notification() {
            tracing::debug!(method = %req.method, "notification, no response");
            return None;
        }
        let id = req.id.clone().unwrap_or(Value::Null);

        let response = match req.method.as_str() {
            "initialize" => to_response(id, &self.initialize()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => to_response(id, &json!({ "tools": self.list_tools() })),
            "tools/call" => match parse_call_params(req.params.as_ref()) {
                Ok((name, arguments)) => {
                    let result = self.call_tool(&name, arguments.as_ref()).await;
                    to_response(id, &result)
                }
                Err(reason) => JsonRpcResponse::failure(id, error_codes::INVALID_PARAMS, reason),
            },
            other => {
                tracing::warn!(method = %other, "unknown method");
                JsonRpcResponse::failure(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                )
            }
        };

        Some(response)
    }
}

/// Extract `name` and `arguments` from `tools/call` params.
fn parse_call_params(params: Option<&Value>) -> Result<(String, Option<Value>), String> {
    let params = params
        .and_then(Value::as_object)
        .ok_or_else(|| "Invalid params: expected an object".to_string())?;
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| "Invalid params: missing tool name".to_string())?;
    Ok((name.to_string(), params.get("arguments").cloned()))
}

fn to_response<T: serde::Serialize>(id: Value, payload: &T) -> JsonRpcResponse {
    match serde_json::to_value(payload) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => JsonRpcResponse::failure(
            id,
            error_codes::INTERNAL_ERROR,
            format!("failed to serialize result: {e}"),
        ),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
