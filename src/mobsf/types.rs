//! Shared types for the MobSF backend.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The backend's JSON report: an open bag of named fields whose shape depends
/// on the platform.
pub type RawReport = serde_json::Map<String, serde_json::Value>;

// ─── PlatformKind ────────────────────────────────────────────────────────────

/// Mobile platform of the binary being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Android,
    Ios,
}

impl PlatformKind {
    /// Classify a file by its extension, case-insensitively.
    ///
    /// `.apk` → Android, `.ipa` → iOS, anything else → `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "apk" => Some(PlatformKind::Android),
            "ipa" => Some(PlatformKind::Ios),
            _ => None,
        }
    }

    /// The `scan_type` form value MobSF dispatches on.
    pub fn scan_type(self) -> &'static str {
        match self {
            PlatformKind::Android => "apk",
            PlatformKind::Ios => "ios",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Android => write!(f, "android"),
            PlatformKind::Ios => write!(f, "ios"),
        }
    }
}

// ─── UploadResult ────────────────────────────────────────────────────────────

/// Response of `POST /api/v1/upload`.
///
/// `hash` correlates every later call for this scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub hash: String,
    pub file_name: String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_extension() {
        assert_eq!(
            PlatformKind::from_path(Path::new("/tmp/app.apk")),
            Some(PlatformKind::Android)
        );
        assert_eq!(
            PlatformKind::from_path(Path::new("Build.IPA")),
            Some(PlatformKind::Ios)
        );
        assert_eq!(
            PlatformKind::from_path(Path::new("release.tar.Apk")),
            Some(PlatformKind::Android)
        );
    }

    #[test]
    fn test_platform_rejects_other_extensions() {
        for name in ["app.zip", "app", "app.apk.bak", ".apk", "app.appx", ""] {
            assert_eq!(PlatformKind::from_path(Path::new(name)), None, "{name}");
        }
    }

    #[test]
    fn test_scan_type() {
        assert_eq!(PlatformKind::Android.scan_type(), "apk");
        assert_eq!(PlatformKind::Ios.scan_type(), "ios");
    }

    #[test]
    fn test_upload_result_ignores_extra_fields() {
        let json = r#"{"hash": "abc123", "file_name": "app.apk", "scan_type": "apk", "status": "success"}"#;
        let upload: UploadResult = serde_json::from_str(json).unwrap();
        assert_eq!(upload.hash, "abc123");
        assert_eq!(upload.file_name, "app.apk");
    }

    #[test]
    fn test_upload_result_requires_hash() {
        let json = r#"{"file_name": "app.apk"}"#;
        assert!(serde_json::from_str::<UploadResult>(json).is_err());
    }
}
