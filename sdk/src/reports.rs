//! Structured operation reports
//!
//! Every public lifecycle operation resolves to one of these reports. Errors
//! are caught at the operation boundary and folded into the report, so hosts
//! consume a single shape per operation instead of matching on error types.

use crate::errors::LifecycleError;
use serde::{Deserialize, Serialize};

/// Result of an install operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,
    #[serde(default)]
    pub modules_created: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    pub page_created: bool,
    pub files_copied: usize,
}

impl InstallReport {
    /// Build a failure report from a lifecycle error
    ///
    /// An already-installed conflict still reports the existing record id so
    /// the host can link to it.
    pub fn failure(error: &LifecycleError) -> Self {
        let plugin_id = match error {
            LifecycleError::AlreadyInstalled(id) => Some(id.clone()),
            _ => None,
        };

        Self {
            success: false,
            error: Some(error.to_string()),
            plugin_id,
            plugin_slug: None,
            plugin_name: None,
            modules_created: vec![],
            page_id: None,
            page_created: false,
            files_copied: 0,
        }
    }
}

/// Result of an uninstall operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    pub modules_deleted: u64,
    pub page_deleted: bool,
}

impl UninstallReport {
    /// Build a failure report from a lifecycle error
    pub fn failure(error: &LifecycleError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            plugin_id: None,
            modules_deleted: 0,
            page_deleted: false,
        }
    }
}

/// Installation state reported by a status check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStatus {
    NotInstalled,
    Healthy,
    Unhealthy,
    Error,
}

impl InstallStatus {
    /// String form used in text output
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallStatus::NotInstalled => "not_installed",
            InstallStatus::Healthy => "healthy",
            InstallStatus::Unhealthy => "unhealthy",
            InstallStatus::Error => "error",
        }
    }
}

/// Result of a status check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub exists: bool,
    pub status: InstallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    /// Report for a plugin with no persisted records
    pub fn not_installed() -> Self {
        Self {
            exists: false,
            status: InstallStatus::NotInstalled,
            plugin_id: None,
            plugin: None,
            health: None,
            error: None,
        }
    }

    /// Build a failure report from a lifecycle error
    pub fn failure(error: &LifecycleError) -> Self {
        Self {
            exists: false,
            status: InstallStatus::Error,
            plugin_id: None,
            plugin: None,
            health: None,
            error: Some(error.to_string()),
        }
    }
}

/// Persisted plugin row summary included in status reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Filesystem health of an installed bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub bundle_exists: bool,
    pub bundle_size: u64,
    pub manifest_valid: bool,
    /// BLAKE3 digest of the bundle entry point, when it exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_digest: Option<String>,
}

impl HealthDetails {
    /// An installation is healthy when the entry point exists with content
    /// and the bundle manifest parses
    pub fn is_healthy(&self) -> bool {
        self.bundle_exists && self.bundle_size > 0 && self.manifest_valid
    }
}

/// Result of a standalone bundle validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    /// Report for a bundle that passed all checks
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// Build a failure report from a lifecycle error
    pub fn failure(error: &LifecycleError) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}
