//! Bundle staging and filesystem health
//!
//! A plugin bundle is a directory containing a `package.json` manifest and a
//! built entry point (for FocusFlow, `dist/remoteEntry.js`). Installation
//! stages the bundle under the host's shared directory at
//! `<base>/shared/<slug>/v<version>`, and status checks read the staged copy
//! back to judge health.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sdk::errors::LifecycleError;
use sdk::reports::{HealthDetails, ValidationReport};
use serde_json::Value;
use tracing::{debug, warn};

/// Entry names never copied into the shared directory
const EXCLUDED_NAMES: &[&str] = &[
    "node_modules",
    "package-lock.json",
    ".git",
    ".gitignore",
    "__pycache__",
    ".DS_Store",
    "Thumbs.db",
];

/// File suffixes never copied into the shared directory
const EXCLUDED_SUFFIXES: &[&str] = &[".pyc", ".tmp"];

/// Outcome of staging a bundle
#[derive(Debug, Default)]
pub struct CopySummary {
    /// Source-relative paths of the files copied
    pub copied: Vec<String>,
}

/// Shared directory for a plugin version: `<base>/shared/<slug>/<version_dir>`
pub fn shared_path(base: &Path, slug: &str, version_dir: &str) -> PathBuf {
    base.join("shared").join(slug).join(version_dir)
}

fn is_excluded(name: &str) -> bool {
    EXCLUDED_NAMES.contains(&name) || EXCLUDED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Copy a bundle directory into the shared path
///
/// Development artifacts (`node_modules`, VCS metadata, bytecode caches) are
/// skipped. A file that fails to copy is logged and skipped so one bad entry
/// does not abort the whole bundle; a source that cannot be read at all is an
/// error.
pub async fn copy_bundle(source: &Path, dest: &Path) -> Result<CopySummary, LifecycleError> {
    if !source.is_dir() {
        return Err(LifecycleError::Copy(format!(
            "bundle source is not a directory: {}",
            source.display()
        )));
    }

    tokio::fs::create_dir_all(dest).await.map_err(|e| {
        LifecycleError::Copy(format!("cannot create {}: {}", dest.display(), e))
    })?;

    let mut summary = CopySummary::default();
    let mut pending = vec![(source.to_path_buf(), dest.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&src_dir).await.map_err(|e| {
            LifecycleError::Copy(format!("cannot read {}: {}", src_dir.display(), e))
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LifecycleError::Copy(format!("cannot read {}: {}", src_dir.display(), e)))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_excluded(&name) {
                debug!(entry = %name, "Skipping excluded bundle entry");
                continue;
            }

            let src = entry.path();
            let dst = dst_dir.join(&name);
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    warn!(file = %src.display(), error = %e, "Cannot stat bundle entry, skipping");
                    continue;
                }
            };

            if file_type.is_dir() {
                if let Err(e) = tokio::fs::create_dir_all(&dst).await {
                    warn!(dir = %dst.display(), error = %e, "Cannot create bundle subdirectory, skipping");
                    continue;
                }
                pending.push((src, dst));
            } else if file_type.is_file() {
                match tokio::fs::copy(&src, &dst).await {
                    Ok(_) => {
                        let rel = src
                            .strip_prefix(source)
                            .map(|p| p.display().to_string())
                            .unwrap_or(name);
                        summary.copied.push(rel);
                    }
                    Err(e) => {
                        warn!(file = %src.display(), error = %e, "Failed to copy bundle file, skipping");
                    }
                }
            }
            // Symlinks and special files are not staged
        }
    }

    Ok(summary)
}

/// Remove a staged directory, reporting whether anything was there
pub async fn remove_dir_if_present(dir: &Path) -> Result<bool, LifecycleError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LifecycleError::Io(e)),
    }
}

/// Validate a bundle directory without touching the database
pub async fn validate(dir: &Path, bundle_location: &str) -> ValidationReport {
    match validate_bundle(dir, bundle_location).await {
        Ok(()) => ValidationReport::ok(),
        Err(e) => ValidationReport::failure(&e),
    }
}

async fn validate_bundle(dir: &Path, bundle_location: &str) -> Result<(), LifecycleError> {
    if !dir.is_dir() {
        return Err(LifecycleError::Verification(format!(
            "bundle directory does not exist: {}",
            dir.display()
        )));
    }

    let required = ["package.json", bundle_location];
    let missing: Vec<&str> = required
        .iter()
        .filter(|f| !dir.join(f).is_file())
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(LifecycleError::Verification(format!(
            "missing required files: {}",
            missing.join(", ")
        )));
    }

    read_manifest(dir).await?;

    let entry_point = dir.join(bundle_location);
    let size = tokio::fs::metadata(&entry_point).await?.len();
    if size == 0 {
        return Err(LifecycleError::Verification(format!(
            "bundle entry point is empty: {}",
            entry_point.display()
        )));
    }

    Ok(())
}

/// Parse the bundle manifest, returning its name and version
async fn read_manifest(dir: &Path) -> Result<(String, String), LifecycleError> {
    let path = dir.join("package.json");
    let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
        LifecycleError::Manifest(format!("cannot read {}: {}", path.display(), e))
    })?;

    let manifest: Value = serde_json::from_str(&raw)
        .map_err(|e| LifecycleError::Manifest(format!("package.json is not valid JSON: {}", e)))?;

    let name = manifest
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| LifecycleError::Manifest("package.json has no name field".to_string()))?;
    let version = manifest
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| LifecycleError::Manifest("package.json has no version field".to_string()))?;

    Ok((name.to_string(), version.to_string()))
}

/// Inspect a staged bundle and report its filesystem health
///
/// Never fails: each probe degrades to an unhealthy field instead. The digest
/// covers the entry point only, which is what the host actually loads.
pub async fn health_check(dir: &Path, bundle_location: &str) -> HealthDetails {
    let entry_point = dir.join(bundle_location);

    let (bundle_exists, bundle_size) = match tokio::fs::metadata(&entry_point).await {
        Ok(meta) if meta.is_file() => (true, meta.len()),
        Ok(_) | Err(_) => (false, 0),
    };

    let manifest_valid = read_manifest(dir).await.is_ok();

    let bundle_digest = if bundle_exists {
        match tokio::fs::read(&entry_point).await {
            Ok(bytes) => Some(blake3::hash(&bytes).to_hex().to_string()),
            Err(e) => {
                warn!(file = %entry_point.display(), error = %e, "Cannot hash bundle entry point");
                None
            }
        }
    } else {
        None
    };

    HealthDetails {
        bundle_exists,
        bundle_size,
        manifest_valid,
        bundle_digest,
    }
}
