//! In-memory [`ScanBackend`] for tests: canned responses plus call recording.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::client::ScanBackend;
use super::errors::BackendError;
use super::types::{PlatformKind, RawReport, UploadResult};

/// Canned outcome of one backend call.
#[derive(Debug, Clone)]
pub enum MockResponse<T> {
    Ok(T),
    Status(u16, String),
    Transport(String),
}

impl<T: Clone> MockResponse<T> {
    fn to_result(&self, endpoint: &str) -> Result<T, BackendError> {
        match self {
            MockResponse::Ok(v) => Ok(v.clone()),
            MockResponse::Status(status, body) => Err(BackendError::HttpStatus {
                status: *status,
                body: body.clone(),
            }),
            MockResponse::Transport(reason) => Err(BackendError::Transport {
                endpoint: endpoint.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

pub struct MockBackend {
    upload: MockResponse<UploadResult>,
    trigger: MockResponse<()>,
    report: MockResponse<RawReport>,
    upload_calls: AtomicUsize,
    trigger_calls: AtomicUsize,
    report_calls: AtomicUsize,
    triggered: Mutex<Vec<(String, String, PlatformKind)>>,
    reported_hashes: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Every call succeeds; the report is `report` (must be a JSON object).
    pub fn succeeding(hash: &str, file_name: &str, report: Value) -> Self {
        Self {
            upload: MockResponse::Ok(UploadResult {
                hash: hash.to_string(),
                file_name: file_name.to_string(),
            }),
            trigger: MockResponse::Ok(()),
            report: MockResponse::Ok(report.as_object().cloned().unwrap_or_default()),
            upload_calls: AtomicUsize::new(0),
            trigger_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
            triggered: Mutex::new(Vec::new()),
            reported_hashes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload(mut self, response: MockResponse<UploadResult>) -> Self {
        self.upload = response;
        self
    }

    pub fn with_trigger(mut self, response: MockResponse<()>) -> Self {
        self.trigger = response;
        self
    }

    pub fn with_report(mut self, response: MockResponse<RawReport>) -> Self {
        self.report = response;
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.upload_calls() + self.trigger_calls() + self.report_calls()
    }

    /// `(hash, file_name, platform)` of every trigger call.
    pub fn triggered(&self) -> Vec<(String, String, PlatformKind)> {
        self.triggered.lock().unwrap().clone()
    }

    pub fn reported_hashes(&self) -> Vec<String> {
        self.reported_hashes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScanBackend for MockBackend {
    async fn upload(&self, _file: &Path) -> Result<UploadResult, BackendError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload.to_result("/api/v1/upload")
    }

    async fn trigger_scan(
        &self,
        upload: &UploadResult,
        platform: PlatformKind,
    ) -> Result<(), BackendError> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        self.triggered.lock().unwrap().push((
            upload.hash.clone(),
            upload.file_name.clone(),
            platform,
        ));
        self.trigger.to_result("/api/v1/scan")
    }

    async fn fetch_report(&self, hash: &str) -> Result<RawReport, BackendError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.reported_hashes.lock().unwrap().push(hash.to_string());
        self.report.to_result("/api/v1/report_json")
    }
}
