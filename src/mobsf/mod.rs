//! MobSF backend — REST client, report summarizer and scan orchestration.
//!
//! This module handles:
//! - Backend configuration from the environment / `.env`
//! - The upload → scan → report_json call sequence
//! - Normalizing backend failures into one message
//! - Projecting raw reports onto the platform-specific summary
//!
//! The orchestrator talks to the backend through the [`ScanBackend`] trait so
//! tests can substitute an in-memory backend.

pub mod client;
pub mod config;
pub mod errors;
#[cfg(test)]
pub mod mock_backend;
pub mod orchestrator;
pub mod summary;
pub mod types;

// Re-exports for convenience
pub use client::{MobsfClient, ScanBackend};
pub use config::MobsfConfig;
pub use errors::{BackendError, ScanError};
pub use orchestrator::{ScanOrchestrator, ScanState};
pub use summary::{summarize, Summary};
pub use types::{PlatformKind, RawReport, UploadResult};
