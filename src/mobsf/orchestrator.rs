//! Scan orchestration.
//!
//! One `scanFile` call walks a fixed state machine:
//!
//! ```text
//! Classify -> Upload -> Trigger -> FetchReport -> Summarize -> Done
//! ```
//!
//! Each remote step runs only after the previous one succeeded. There are no
//! retries and no timeouts beyond the HTTP client's connect timeout. The first
//! failure ends the scan; nothing from earlier steps (such as the upload hash)
//! is reported back.

use std::path::PathBuf;
use std::sync::Arc;

use crate::logging::DiagnosticLog;

use super::client::ScanBackend;
use super::errors::{BackendError, ScanError};
use super::summary::{summarize, Summary};
use super::types::{PlatformKind, RawReport, UploadResult};

// ─── ScanState ───────────────────────────────────────────────────────────────

/// Where a scan currently is, carrying exactly what the next step needs.
#[derive(Debug)]
pub enum ScanState {
    Classify { file: PathBuf },
    Upload { file: PathBuf, platform: PlatformKind },
    Trigger { platform: PlatformKind, upload: UploadResult },
    FetchReport { platform: PlatformKind, hash: String },
    Summarize { platform: PlatformKind, report: RawReport },
    Done(Summary),
}

impl ScanState {
    pub fn stage(&self) -> &'static str {
        match self {
            ScanState::Classify { .. } => "classify",
            ScanState::Upload { .. } => "upload",
            ScanState::Trigger { .. } => "trigger",
            ScanState::FetchReport { .. } => "fetch_report",
            ScanState::Summarize { .. } => "summarize",
            ScanState::Done(_) => "done",
        }
    }
}

// ─── ScanOrchestrator ────────────────────────────────────────────────────────

/// Runs `scanFile` against a [`ScanBackend`].
///
/// Holds no per-scan state, so one orchestrator can serve concurrent calls.
pub struct ScanOrchestrator {
    backend: Arc<dyn ScanBackend>,
    log: Arc<dyn DiagnosticLog>,
}

impl ScanOrchestrator {
    pub fn new(backend: Arc<dyn ScanBackend>, log: Arc<dyn DiagnosticLog>) -> Self {
        Self { backend, log }
    }

    /// Scan `file` and return the summary as pretty-printed JSON.
    pub async fn scan_file(&self, file: &str) -> Result<String, ScanError> {
        let summary = self.run(file).await?;
        summary.to_pretty_json().map_err(|e| ScanError::Encode {
            reason: e.to_string(),
        })
    }

    /// Drive the state machine to completion or to the first failure.
    pub async fn run(&self, file: &str) -> Result<Summary, ScanError> {
        let mut state = ScanState::Classify {
            file: PathBuf::from(file),
        };

        loop {
            state = match state {
                ScanState::Done(summary) => return Ok(summary),
                pending => {
                    let from = pending.stage();
                    let next = self.step(pending).await?;
                    tracing::debug!(from, to = next.stage(), "scan state transition");
                    next
                }
            };
        }
    }

    /// Advance one state.
    pub async fn step(&self, state: ScanState) -> Result<ScanState, ScanError> {
        match state {
            ScanState::Classify { file } => {
                let platform =
                    PlatformKind::from_path(&file).ok_or(ScanError::UnsupportedFileType)?;
                Ok(ScanState::Upload { file, platform })
            }

            ScanState::Upload { file, platform } => {
                self.log
                    .append(&format!("Uploading file: {}", file.display()));
                let upload = self
                    .backend
                    .upload(&file)
                    .await
                    .map_err(|e| self.backend_failure(e))?;
                self.log.append(&format!(
                    "Uploaded successfully. Hash: {}, File: {}",
                    upload.hash, upload.file_name
                ));
                Ok(ScanState::Trigger { platform, upload })
            }

            ScanState::Trigger { platform, upload } => {
                self.backend
                    .trigger_scan(&upload, platform)
                    .await
                    .map_err(|e| self.backend_failure(e))?;
                Ok(ScanState::FetchReport {
                    platform,
                    hash: upload.hash,
                })
            }

            ScanState::FetchReport { platform, hash } => {
                let report = self
                    .backend
                    .fetch_report(&hash)
                    .await
                    .map_err(|e| self.backend_failure(e))?;
                Ok(ScanState::Summarize { platform, report })
            }

            ScanState::Summarize { platform, report } => {
                Ok(ScanState::Done(summarize(&report, platform)))
            }

            done @ ScanState::Done(_) => Ok(done),
        }
    }

    fn backend_failure(&self, err: BackendError) -> ScanError {
        let message = err.normalized_message();
        tracing::warn!(error = %err, status = ?err.status(), "MobSF call failed");
        self.log.append(&format!("MobSF error: {message}"));
        ScanError::Backend { message }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use crate::mobsf::mock_backend::{MockBackend, MockResponse};
    use serde_json::{json, Value};

    fn orchestrator(backend: Arc<MockBackend>) -> (ScanOrchestrator, MemoryLog) {
        let log = MemoryLog::new();
        (ScanOrchestrator::new(backend, Arc::new(log.clone())), log)
    }

    fn android_report() -> Value {
        json!({
            "app_name": "Demo",
            "package_name": "com.example.demo",
            "version_name": "1.0",
            "permissions": {"android.permission.CAMERA": {"status": "dangerous"}},
            "exported_activities": [],
            "services": ["com.example.demo.Sync"],
            "receivers": [],
            "providers": [],
            "manifest_analysis": {"manifest_summary": {"high": 1}},
            "urls": [],
            "domains": {},
            "tracker_analysis": {"detected_trackers": 2},
            "network_security": {"network_findings": []},
            "code_analysis": {"findings": {"android_logging": {}}}
        })
    }

    #[tokio::test]
    async fn test_unsupported_extension_makes_no_backend_call() {
        for file in ["/tmp/app.zip", "/tmp/app", "/tmp/app.exe", "notes.txt"] {
            let backend = Arc::new(MockBackend::succeeding("H", "f", json!({})));
            let (orch, _log) = orchestrator(backend.clone());

            let err = orch.scan_file(file).await.unwrap_err();
            assert_eq!(err, ScanError::UnsupportedFileType);
            assert_eq!(err.to_string(), "Unsupported file type. Must be .apk or .ipa");
            assert_eq!(backend.total_calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_android_scan_success() {
        let report = android_report();
        let backend = Arc::new(MockBackend::succeeding("H1", "demo.apk", report.clone()));
        let (orch, log) = orchestrator(backend.clone());

        let text = orch.scan_file("/data/Demo.APK").await.unwrap();
        let summary: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(summary["app_name"], report["app_name"]);
        assert_eq!(summary["package_name"], report["package_name"]);
        assert_eq!(summary["permissions"], report["permissions"]);
        assert_eq!(
            summary["analysis_findings"]["tracker_analysis"],
            report["tracker_analysis"]
        );
        assert!(summary.get("code_analysis").is_none());
        assert_eq!(summary.as_object().unwrap().len(), 9);
        assert_eq!(summary["analysis_findings"].as_object().unwrap().len(), 5);

        assert_eq!(backend.upload_calls(), 1);
        assert_eq!(backend.trigger_calls(), 1);
        assert_eq!(backend.report_calls(), 1);

        // Hash threads through unchanged.
        assert_eq!(
            backend.triggered(),
            vec![("H1".to_string(), "demo.apk".to_string(), PlatformKind::Android)]
        );
        assert_eq!(backend.reported_hashes(), vec!["H1".to_string()]);

        assert_eq!(
            log.entries(),
            vec![
                "Uploading file: /data/Demo.APK".to_string(),
                "Uploaded successfully. Hash: H1, File: demo.apk".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_ios_scan_success_renames_fields() {
        let report = json!({
            "app_name": "DemoKit",
            "identifier": "com.example.demokit",
            "version": "2.1",
            "minimum_os": "15.0",
            "platform": "iPhoneOS",
            "archs": ["arm64", "arm64e"],
            "entitlements": {},
            "url_schemes": ["demokit"],
            "binary_code_analysis": {},
            "possible_hardcoded_secrets": ["api_key=..."],
            "binary_analysis": [],
            "strings_analysis": [],
            "keychain_analysis": []
        });
        let backend = Arc::new(MockBackend::succeeding("H2", "demokit.ipa", report));
        let (orch, _log) = orchestrator(backend.clone());

        let text = orch.scan_file("demokit.ipa").await.unwrap();
        let summary: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(summary["bundle_id"], "com.example.demokit");
        assert_eq!(summary["min_ios_version"], "15.0");
        assert_eq!(summary["binary_archs"], json!(["arm64", "arm64e"]));
        assert_eq!(
            summary["analysis_findings"]["possible_hardcoded_secrets"],
            json!(["api_key=..."])
        );
        assert_eq!(backend.triggered()[0].2, PlatformKind::Ios);
    }

    #[tokio::test]
    async fn test_upload_failure_stops_workflow() {
        let backend = Arc::new(
            MockBackend::succeeding("H", "f.apk", json!({}))
                .with_upload(MockResponse::Status(400, r#"{"error":"bad file"}"#.into())),
        );
        let (orch, log) = orchestrator(backend.clone());

        let err = orch.scan_file("f.apk").await.unwrap_err();
        assert_eq!(
            err,
            ScanError::Backend {
                message: r#"{"error":"bad file"}"#.into()
            }
        );
        assert_eq!(backend.upload_calls(), 1);
        assert_eq!(backend.trigger_calls(), 0);
        assert_eq!(backend.report_calls(), 0);
        assert!(log.contains(r#"MobSF error: {"error":"bad file"}"#));
    }

    #[tokio::test]
    async fn test_trigger_failure_reports_no_partial_data() {
        let backend = Arc::new(
            MockBackend::succeeding("SECRET_HASH", "f.apk", json!({}))
                .with_trigger(MockResponse::Transport("connection reset".into())),
        );
        let (orch, _log) = orchestrator(backend.clone());

        let err = orch.scan_file("f.apk").await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert!(!format!("{err:?}").contains("SECRET_HASH"));
        assert_eq!(backend.report_calls(), 0);
    }

    #[tokio::test]
    async fn test_report_failure() {
        let backend = Arc::new(
            MockBackend::succeeding("H", "f.ipa", json!({}))
                .with_report(MockResponse::Status(500, String::new())),
        );
        let (orch, _log) = orchestrator(backend.clone());

        let err = orch.scan_file("f.ipa").await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(backend.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_step_walks_states_in_order() {
        let backend = Arc::new(MockBackend::succeeding("H", "f.apk", json!({"app_name": "A"})));
        let (orch, _log) = orchestrator(backend);

        let mut state = ScanState::Classify {
            file: PathBuf::from("f.apk"),
        };
        let mut stages = vec![state.stage()];
        while !matches!(state, ScanState::Done(_)) {
            state = orch.step(state).await.unwrap();
            stages.push(state.stage());
        }
        assert_eq!(
            stages,
            vec!["classify", "upload", "trigger", "fetch_report", "summarize", "done"]
        );
    }
}
