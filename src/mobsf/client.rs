//! MobSF REST client.
//!
//! Three calls, always in this order for one scan:
//! - `POST /api/v1/upload` — multipart, field `file`
//! - `POST /api/v1/scan` — form-urlencoded `hash`, `scan_type`, `file_name`
//! - `POST /api/v1/report_json` — form-urlencoded `hash`
//!
//! MobSF dispatches on content type, so upload must stay multipart and the
//! other two must stay form-urlencoded.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client as HttpClient, RequestBuilder, Response};

use super::config::MobsfConfig;
use super::errors::BackendError;
use super::types::{PlatformKind, RawReport, UploadResult};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout. Scans themselves can run for minutes, so there is
/// no total request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const UPLOAD_PATH: &str = "/api/v1/upload";
pub const SCAN_PATH: &str = "/api/v1/scan";
pub const REPORT_PATH: &str = "/api/v1/report_json";

// ─── ScanBackend ─────────────────────────────────────────────────────────────

/// The remote operations the orchestrator needs from a scanning backend.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Upload the binary at `file`.
    async fn upload(&self, file: &Path) -> Result<UploadResult, BackendError> {
        let file_read_error = |e: std::io::Error| BackendError::FileRead {
            path: file.display().to_string(),
            reason: e.to_string(),
        };
        let handle = tokio::fs::File::open(file).await.map_err(file_read_error)?;
        let size = handle.metadata().await.map_err(file_read_error)?.len();

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        // Streamed from disk with a known length, so the request still
        // carries Content-Length.
        let part = Part::stream_with_length(Body::from(handle), size)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| BackendError::Transport {
                endpoint: self.config.endpoint(UPLOAD_PATH),
                reason: format!("failed to build multipart body: {e}"),
            })?;
        let form = Form::new().part("file", part);

        let (url, req) = self.post(UPLOAD_PATH);
        tracing::info!(url = %url, file = %file.display(), bytes = size, "uploading to MobSF");

        let body = Self::send(&url, req.multipart(form)).await?;
        parse_upload_response(&url, &body)
    }

    async fn trigger_scan(
        &self,
        upload: &UploadResult,
        platform: PlatformKind,
    ) -> Result<(), BackendError> {
        let (url, req) = self.post(SCAN_PATH);
        tracing::info!(url = %url, hash = %upload.hash, scan_type = platform.scan_type(), "triggering MobSF scan");

        let form = [
            ("hash", upload.hash.as_str()),
            ("scan_type", platform.scan_type()),
            ("file_name", upload.file_name.as_str()),
        ];
        Self::send(&url, req.form(&form)).await?;
        Ok(())
    }

    async fn fetch_report(&self, hash: &str) -> Result<RawReport, BackendError> {
        let (url, req) = self.post(REPORT_PATH);
        tracing::info!(url = %url, hash = %hash, "fetching MobSF report");

        let body = Self::send(&url, req.form(&[("hash", hash)])).await?;
        parse_report_response(&url, &body)
    }
}

// ─── Response Helpers ────────────────────────────────────────────────────────

fn parse_upload_response(url: &str, body: &str) -> Result<UploadResult, BackendError> {
    serde_json::from_str::<UploadResult>(body).map_err(|e| BackendError::MalformedResponse {
        endpoint: url.to_string(),
        reason: format!("expected hash and file_name: {e}"),
    })
}

fn parse_report_response(url: &str, body: &str) -> Result<RawReport, BackendError> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(BackendError::MalformedResponse {
            endpoint: url.to_string(),
            reason: "report is not a JSON object".into(),
        }),
        Err(e) => Err(BackendError::MalformedResponse {
            endpoint: url.to_string(),
            reason: format!("report is not valid JSON: {e}"),
        }),
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_connect() {
        format!("connection failed: {e}")
    } else if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
