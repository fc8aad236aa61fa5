//! Plugin lifecycle trait
//!
//! This module defines the PluginLifecycle trait that every plugin lifecycle
//! manager implements. The host drives installs, uninstalls, and status
//! checks through the provided dispatch methods, which gate on the persisted
//! installation state. There is no in-memory set of active users: two host
//! workers asking about the same user always consult the same database rows.

use crate::descriptor::{ModuleDescriptor, PluginDescriptor};
use crate::errors::LifecycleError;
use crate::reports::{InstallReport, StatusReport, UninstallReport};
use async_trait::async_trait;

/// Trait that all plugin lifecycle managers must implement
///
/// Implementors supply the per-step behavior (`perform_install`,
/// `perform_uninstall`, `current_status`) plus an existence check; the
/// provided `install_for_user` and `uninstall_for_user` wrap those steps with
/// the state gating every plugin needs.
#[async_trait]
pub trait PluginLifecycle: Send + Sync {
    /// Static metadata for the plugin this manager handles
    fn descriptor(&self) -> &PluginDescriptor;

    /// Module definitions registered alongside the plugin
    fn modules(&self) -> &[ModuleDescriptor];

    /// Check the persisted installation state for a user
    async fn is_installed(&self, user_id: &str) -> Result<bool, LifecycleError>;

    /// Run the installation steps for a user
    ///
    /// Called only after the existence gate has passed; implementations may
    /// assume no records exist yet and must clean up after partial failures.
    async fn perform_install(&self, user_id: &str) -> Result<InstallReport, LifecycleError>;

    /// Run the uninstallation steps for a user
    async fn perform_uninstall(&self, user_id: &str) -> Result<UninstallReport, LifecycleError>;

    /// Inspect installation state and bundle health for a user
    async fn current_status(&self, user_id: &str) -> Result<StatusReport, LifecycleError>;

    /// Install the plugin for a user, failing fast if already installed
    async fn install_for_user(&self, user_id: &str) -> Result<InstallReport, LifecycleError> {
        if self.is_installed(user_id).await? {
            let existing = self.descriptor().record_id(user_id);
            return Err(LifecycleError::AlreadyInstalled(existing));
        }
        self.perform_install(user_id).await
    }

    /// Uninstall the plugin for a user, failing fast if not installed
    async fn uninstall_for_user(&self, user_id: &str) -> Result<UninstallReport, LifecycleError> {
        if !self.is_installed(user_id).await? {
            return Err(LifecycleError::NotFound(user_id.to_string()));
        }
        self.perform_uninstall(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ModuleLayout;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minimal lifecycle manager with a fixed installed-state answer
    struct FixedState {
        descriptor: PluginDescriptor,
        modules: Vec<ModuleDescriptor>,
        installed: bool,
        installs: AtomicUsize,
        uninstalls: AtomicUsize,
    }

    impl FixedState {
        fn new(installed: bool) -> Self {
            Self {
                descriptor: PluginDescriptor {
                    name: "Fixed".to_string(),
                    description: String::new(),
                    version: "1.0.0".to_string(),
                    plugin_type: "frontend".to_string(),
                    icon: "Extension".to_string(),
                    category: "test".to_string(),
                    official: false,
                    author: "Tests".to_string(),
                    compatibility: "1.0.0".to_string(),
                    scope: "Fixed".to_string(),
                    bundle_method: "webpack".to_string(),
                    bundle_location: "dist/remoteEntry.js".to_string(),
                    is_local: true,
                    long_description: String::new(),
                    plugin_slug: "Fixed".to_string(),
                    source_type: "local".to_string(),
                    source_url: String::new(),
                    update_check_url: String::new(),
                    installation_type: "prebuilt".to_string(),
                    permissions: vec![],
                },
                modules: vec![ModuleDescriptor {
                    name: "Cell".to_string(),
                    display_name: "Cell".to_string(),
                    description: String::new(),
                    icon: "Extension".to_string(),
                    category: "test".to_string(),
                    priority: 1,
                    props: Default::default(),
                    config_fields: Default::default(),
                    messages: Default::default(),
                    required_services: Default::default(),
                    dependencies: vec![],
                    layout: ModuleLayout {
                        min_width: 1,
                        min_height: 1,
                        default_width: 2,
                        default_height: 2,
                    },
                    tags: vec![],
                }],
                installed,
                installs: AtomicUsize::new(0),
                uninstalls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PluginLifecycle for FixedState {
        fn descriptor(&self) -> &PluginDescriptor {
            &self.descriptor
        }

        fn modules(&self) -> &[ModuleDescriptor] {
            &self.modules
        }

        async fn is_installed(&self, _user_id: &str) -> Result<bool, LifecycleError> {
            Ok(self.installed)
        }

        async fn perform_install(&self, user_id: &str) -> Result<InstallReport, LifecycleError> {
            self.installs.fetch_add(1, Ordering::SeqCst);
            Ok(InstallReport {
                success: true,
                error: None,
                plugin_id: Some(self.descriptor.record_id(user_id)),
                plugin_slug: Some(self.descriptor.plugin_slug.clone()),
                plugin_name: Some(self.descriptor.name.clone()),
                modules_created: vec![],
                page_id: None,
                page_created: false,
                files_copied: 0,
            })
        }

        async fn perform_uninstall(&self, user_id: &str) -> Result<UninstallReport, LifecycleError> {
            self.uninstalls.fetch_add(1, Ordering::SeqCst);
            Ok(UninstallReport {
                success: true,
                error: None,
                plugin_id: Some(self.descriptor.record_id(user_id)),
                modules_deleted: 1,
                page_deleted: false,
            })
        }

        async fn current_status(&self, _user_id: &str) -> Result<StatusReport, LifecycleError> {
            Ok(StatusReport::not_installed())
        }
    }

    #[tokio::test]
    async fn test_install_gate_rejects_existing_installation() {
        let manager = FixedState::new(true);

        let err = manager.install_for_user("user-1").await.unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyInstalled(ref id) if id == "user-1_Fixed"));

        // The gate fires before any installation step runs
        assert_eq!(manager.installs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_install_gate_passes_fresh_user() {
        let manager = FixedState::new(false);

        let report = manager.install_for_user("user-1").await.unwrap();
        assert!(report.success);
        assert_eq!(manager.installs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uninstall_gate_rejects_missing_installation() {
        let manager = FixedState::new(false);

        let err = manager.uninstall_for_user("user-1").await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(ref user) if user == "user-1"));
        assert_eq!(manager.uninstalls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_uninstall_gate_passes_installed_user() {
        let manager = FixedState::new(true);

        let report = manager.uninstall_for_user("user-1").await.unwrap();
        assert!(report.success);
        assert_eq!(manager.uninstalls.load(Ordering::SeqCst), 1);
    }
}
