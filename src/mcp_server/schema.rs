//! `scanFile` argument contract.
//!
//! The typed struct is the source of truth; the JSON schema advertised in
//! `tools/list` describes the same shape.

use serde::Deserialize;
use serde_json::{json, Value};

use super::errors::ToolError;

pub const SCAN_FILE_TOOL: &str = "scanFile";
pub const SCAN_FILE_DESCRIPTION: &str = "Upload and scan an APK or IPA using MobSF";
const FILE_DESCRIPTION: &str = "Path to the APK or IPA file to scan with MobSF";

/// Arguments of `scanFile`. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanFileArgs {
    pub file: String,
}

impl ScanFileArgs {
    /// Validate raw `tools/call` arguments.
    pub fn validate(arguments: Option<&Value>) -> Result<Self, ToolError> {
        let invalid = |reason: String| ToolError::InvalidArguments {
            tool: SCAN_FILE_TOOL.to_string(),
            reason,
        };

        let value = arguments.ok_or_else(|| invalid("arguments are required".into()))?;
        if !value.is_object() {
            return Err(invalid(format!("expected an object, got {value}")));
        }
        Self::deserialize(value).map_err(|e| invalid(e.to_string()))
    }
}

/// JSON schema for [`ScanFileArgs`] (draft-07).
pub fn scan_file_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "file": {
                "type": "string",
                "description": FILE_DESCRIPTION
            }
        },
        "required": ["file"],
        "additionalProperties": false,
        "$schema": "http://json-schema.org/draft-07/schema#"
    })
}
