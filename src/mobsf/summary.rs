//! Report summarizer.
//!
//! Projects the backend's sprawling JSON report onto a fixed, platform-specific
//! field set. Field names (including the iOS renames) are the contract MCP
//! clients depend on. Fields missing from the report are omitted from the
//! summary; fields present with `null` stay `null`.

use serde::Serialize;
use serde_json::Value;

use super::types::{PlatformKind, RawReport};

/// Platform-specific projection of a [`RawReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Android(AndroidSummary),
    Ios(IosSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_activities: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receivers: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Value>,
    pub analysis_findings: AndroidFindings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidFindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_security: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IosSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<Value>,
    /// From the report's `identifier`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    /// From the report's `minimum_os`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ios_version: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Value>,
    /// From the report's `archs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_archs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlements: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_schemes: Option<Value>,
    pub analysis_findings: IosFindings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IosFindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_code_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possible_hardcoded_secrets: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strings_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keychain_analysis: Option<Value>,
}

/// Build the summary for `platform` from `report`.
pub fn summarize(report: &RawReport, platform: PlatformKind) -> Summary {
    let field = |key: &str| report.get(key).cloned();

    match platform {
        PlatformKind::Android => Summary::Android(AndroidSummary {
            app_name: field("app_name"),
            package_name: field("package_name"),
            version_name: field("version_name"),
            permissions: field("permissions"),
            exported_activities: field("exported_activities"),
            services: field("services"),
            receivers: field("receivers"),
            providers: field("providers"),
            analysis_findings: AndroidFindings {
                manifest_analysis: field("manifest_analysis"),
                urls: field("urls"),
                domains: field("domains"),
                tracker_analysis: field("tracker_analysis"),
                network_security: field("network_security"),
            },
        }),
        PlatformKind::Ios => Summary::Ios(IosSummary {
            app_name: field("app_name"),
            bundle_id: field("identifier"),
            version: field("version"),
            min_ios_version: field("minimum_os"),
            platform: field("platform"),
            binary_archs: field("archs"),
            entitlements: field("entitlements"),
            url_schemes: field("url_schemes"),
            analysis_findings: IosFindings {
                binary_code_analysis: field("binary_code_analysis"),
                possible_hardcoded_secrets: field("possible_hardcoded_secrets"),
                binary_analysis: field("binary_analysis"),
                strings_analysis: field("strings_analysis"),
                keychain_analysis: field("keychain_analysis"),
            },
        }),
    }
}

impl Summary {
    /// Pretty JSON (two-space indent), the text returned to the MCP client.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
