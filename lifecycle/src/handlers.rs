//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - install: install the plugin for a user
//! - uninstall: remove the plugin for a user
//! - status: show installation state and bundle health
//! - validate: check a bundle directory without installing
//! - info: show plugin metadata and build information
//!
//! Handlers print the operation report (text or JSON) and convert failed
//! reports into a non-zero exit via an error return.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::bundle;
use crate::config::Config;
use crate::db::Database;
use crate::installer::{metadata, Installer};
use sdk::lifecycle::PluginLifecycle;
use sdk::reports::{InstallReport, InstallStatus, StatusReport, UninstallReport};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Open the host database named by the config
async fn open_database(config: &Config) -> Result<Database> {
    Database::new(&config.storage.database)
        .await
        .context("Failed to open database")
}

/// Shared plugins base: a CLI override wins over the configured location
fn resolve_base_dir(override_dir: Option<&Path>, config: &Config) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.plugins_base_dir.clone())
}

fn build_installer(database: &Database, base: &Path, config: &Config) -> Installer {
    Installer::new(database.pool().clone(), Some(base))
        .with_source_dir(config.bundle.source_dir.clone())
}

/// Install the plugin for a user
pub async fn handle_install(
    user_id: String,
    base_dir: Option<PathBuf>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let database = open_database(config).await?;
    let base = resolve_base_dir(base_dir.as_deref(), config);

    let installer = build_installer(&database, &base, config);
    let report = match installer.install_for_user(&user_id).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Install failed");
            InstallReport::failure(&e)
        }
    };

    match format {
        OutputFormat::Text => {
            if report.success {
                println!("✓ FocusFlow installed for {}", user_id);
                if let Some(id) = &report.plugin_id {
                    println!("  Plugin ID: {}", id);
                }
                println!("  Modules:   {}", report.modules_created.join(", "));
                if let Some(page_id) = &report.page_id {
                    let note = if report.page_created {
                        "created"
                    } else {
                        "already existed"
                    };
                    println!("  Page:      {} ({})", page_id, note);
                }
                println!("  Files:     {} copied", report.files_copied);
            } else {
                println!(
                    "✗ Install failed: {}",
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    database.close().await?;

    if !report.success {
        anyhow::bail!("install did not complete");
    }
    Ok(())
}

/// Uninstall the plugin for a user
pub async fn handle_uninstall(
    user_id: String,
    base_dir: Option<PathBuf>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let database = open_database(config).await?;
    let base = resolve_base_dir(base_dir.as_deref(), config);

    let installer = build_installer(&database, &base, config);
    let report = match installer.uninstall_for_user(&user_id).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Uninstall failed");
            UninstallReport::failure(&e)
        }
    };

    match format {
        OutputFormat::Text => {
            if report.success {
                println!("✓ FocusFlow uninstalled for {}", user_id);
                if let Some(id) = &report.plugin_id {
                    println!("  Plugin ID:       {}", id);
                }
                println!("  Modules deleted: {}", report.modules_deleted);
                println!(
                    "  Page deleted:    {}",
                    if report.page_deleted { "yes" } else { "no" }
                );
            } else {
                println!(
                    "✗ Uninstall failed: {}",
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    database.close().await?;

    if !report.success {
        anyhow::bail!("uninstall did not complete");
    }
    Ok(())
}

/// Show installation state and bundle health for a user
pub async fn handle_status(
    user_id: String,
    base_dir: Option<PathBuf>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let database = open_database(config).await?;
    let base = resolve_base_dir(base_dir.as_deref(), config);

    let installer = build_installer(&database, &base, config);
    let report = match installer.current_status(&user_id).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Status check failed");
            StatusReport::failure(&e)
        }
    };

    match format {
        OutputFormat::Text => {
            println!("FocusFlow status for {}: {}", user_id, report.status.as_str());

            if let Some(plugin) = &report.plugin {
                println!("  Plugin ID: {}", plugin.id);
                println!("  Version:   {}", plugin.version);
                println!(
                    "  Enabled:   {}",
                    if plugin.enabled { "yes" } else { "no" }
                );
                println!("  Installed: {}", plugin.created_at);
            }

            if let Some(health) = &report.health {
                println!(
                    "  Bundle:    {}",
                    if health.bundle_exists {
                        format!("present ({} bytes)", health.bundle_size)
                    } else {
                        "missing".to_string()
                    }
                );
                println!(
                    "  Manifest:  {}",
                    if health.manifest_valid { "valid" } else { "invalid" }
                );
                if let Some(digest) = &health.bundle_digest {
                    println!("  Digest:    {}", digest);
                }
            }

            if let Some(error) = &report.error {
                println!("  Error:     {}", error);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    database.close().await?;

    // Not-installed is a valid answer; only an errored check fails the command
    if report.status == InstallStatus::Error {
        anyhow::bail!("status check did not complete");
    }
    Ok(())
}

/// Validate a bundle directory without touching the database
pub async fn handle_validate(dir: &Path, format: OutputFormat) -> Result<()> {
    let bundle_location = metadata::plugin_descriptor().bundle_location;
    let report = bundle::validate(dir, &bundle_location).await;

    match format {
        OutputFormat::Text => {
            if report.valid {
                println!("✓ Bundle at {} is valid", dir.display());
            } else {
                println!(
                    "✗ Bundle at {} is invalid: {}",
                    dir.display(),
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if !report.valid {
        anyhow::bail!("bundle validation failed");
    }
    Ok(())
}

/// Show plugin metadata and build information
pub fn handle_info(format: OutputFormat) -> Result<()> {
    let plugin = metadata::plugin_descriptor();
    let modules = metadata::module_descriptors();
    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    match format {
        OutputFormat::Text => {
            println!("{} v{}", plugin.name, plugin.version);
            println!("  Slug:     {}", plugin.plugin_slug);
            println!("  Category: {}", plugin.category);
            println!("  Bundle:   {}", plugin.bundle_location);
            println!(
                "  Page:     {} (route: {})",
                metadata::PAGE_NAME,
                metadata::PAGE_ROUTE
            );
            println!("  Modules:");
            for module in &modules {
                println!("    {} ({})", module.name, module.display_name);
            }
            println!();
            println!("focusflow-lifecycle v{} ({} - {})", version, commit, timestamp);
        }
        OutputFormat::Json => {
            let output = json!({
                "plugin": plugin,
                "modules": modules,
                "page": {
                    "name": metadata::PAGE_NAME,
                    "route": metadata::PAGE_ROUTE,
                },
                "build": {
                    "version": version,
                    "commit": commit,
                    "timestamp": timestamp,
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
