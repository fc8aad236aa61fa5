//! FocusFlow Lifecycle Library
//!
//! This library implements the FocusFlow plugin lifecycle: staging the bundle
//! into shared storage, registering plugin and module records in the host
//! database, generating the plugin's page, and reporting installation health.
//! It is used by both the CLI binary and integration tests, and can be
//! embedded by a host that drives installs directly.

/// Configuration management module
pub mod config;

/// Database persistence module
pub mod db;

/// Bundle staging and filesystem health module
pub mod bundle;

/// Installation, uninstallation, and status module
pub mod installer;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

pub use installer::{delete_plugin, get_plugin_status, install_plugin, Installer};
