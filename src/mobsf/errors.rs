//! MobSF backend error types.
//!
//! Every failure of the upload / scan / report calls lands in
//! [`BackendError`]. The orchestrator folds those into [`ScanError`], which
//! only ever carries [`BackendError::normalized_message`].

use thiserror::Error;

/// Errors that can occur while talking to the MobSF backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, I/O or timeout failure before a response was received.
    #[error("{reason}")]
    Transport {
        endpoint: String,
        reason: String,
    },

    /// Non-2xx HTTP response.
    #[error("Request failed with status code {status}")]
    HttpStatus {
        status: u16,
        body: String,
    },

    /// A 2xx response whose body does not have the expected shape.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        endpoint: String,
        reason: String,
    },

    /// The binary to upload could not be read.
    #[error("failed to read {path}: {reason}")]
    FileRead {
        path: String,
        reason: String,
    },
}

impl BackendError {
    /// Collapse the error into the single line shown after
    /// `MobSF scan failed: `.
    ///
    /// A backend error body wins when there is one: JSON bodies are
    /// re-serialized compactly, other text is serialized as a JSON string.
    /// Everything else falls back to the error's own description.
    pub fn normalized_message(&self) -> String {
        match self {
            BackendError::HttpStatus { body, .. } if !body.trim().is_empty() => {
                match serde_json::from_str::<serde_json::Value>(body) {
                    Ok(value) => value.to_string(),
                    Err(_) => serde_json::Value::String(body.clone()).to_string(),
                }
            }
            other => other.to_string(),
        }
    }

    /// The HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a scan ended early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The file extension is not `.apk` or `.ipa`. No backend call was made.
    #[error("Unsupported file type. Must be .apk or .ipa")]
    UnsupportedFileType,

    /// A backend call failed; `message` is already normalized.
    #[error("{message}")]
    Backend { message: String },

    /// The summary could not be encoded.
    #[error("failed to encode summary: {reason}")]
    Encode { reason: String },
}
