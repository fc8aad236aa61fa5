//! Error types and handling
//!
//! This module provides the error taxonomy used throughout the lifecycle
//! manager. All errors implement the `LifecycleErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! Errors are raised inside the installer internals and caught at the
//! operation boundary, where they are folded into structured reports. No
//! lifecycle operation propagates a panic or a raw error to the host.

use thiserror::Error;

/// Trait for lifecycle error extensions
///
/// Provides additional context for errors: a hint that is safe to surface in
/// host UI, and recoverability information the host can use to decide whether
/// a retry is worthwhile.
pub trait LifecycleErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain file
    /// paths or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically mean the bundle or the database needs attention first.
    fn is_recoverable(&self) -> bool;
}

/// Main lifecycle error type
///
/// Represents every way a plugin lifecycle operation can fail. Each variant
/// carries the context needed to build a structured report at the operation
/// boundary.
///
/// # Error Categories
///
/// - **State conflicts**: plugin already installed, plugin not found
/// - **Verification**: post-install checks or bundle health failed
/// - **Bundle**: file staging and manifest problems
/// - **Database**: record insertion, deletion, or lookup failures
/// - **Configuration**: invalid or missing configuration
///
/// # Examples
///
/// ```
/// use sdk::errors::{LifecycleError, LifecycleErrorExt};
///
/// let error = LifecycleError::NotFound("user-1".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = LifecycleError::Verification("records missing".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum LifecycleError {
    // Installation state conflicts
    #[error("Plugin already installed: {0}")]
    AlreadyInstalled(String),

    #[error("Plugin not installed for user: {0}")]
    NotFound(String),

    // Post-operation verification errors
    #[error("Installation verification failed: {0}")]
    Verification(String),

    // Bundle staging errors
    #[error("Bundle copy failed: {0}")]
    Copy(String),

    #[error("Invalid bundle manifest: {0}")]
    Manifest(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifecycleErrorExt for LifecycleError {
    fn user_hint(&self) -> &str {
        match self {
            // Installation state conflicts
            Self::AlreadyInstalled(_) => "Plugin is already installed. Uninstall it first to reinstall",
            Self::NotFound(_) => "Plugin is not installed for this user",

            // Post-operation verification errors
            Self::Verification(_) => "Installation left inconsistent state and was rolled back",

            // Bundle staging errors
            Self::Copy(_) => "Could not copy bundle files. Check disk space and permissions",
            Self::Manifest(_) => "Plugin bundle is incomplete or corrupted. Re-download it",

            // Database errors
            Self::Database(_) => "Database operation failed. Check the host database",

            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Verification(_) | Self::Manifest(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
