//! FocusFlow lifecycle manager
//!
//! Ties bundle staging, record insertion, and page generation together behind
//! the `PluginLifecycle` trait. The free functions at the bottom are the
//! host-facing boundary: they never return an error, folding failures into
//! the operation report after logging them.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sdk::descriptor::{ModuleDescriptor, PluginDescriptor};
use sdk::errors::LifecycleError;
use sdk::lifecycle::PluginLifecycle;
use sdk::page::{CellArgs, LayoutCell, PageContent, PageLayouts};
use sdk::reports::{InstallReport, InstallStatus, PluginInfo, StatusReport, UninstallReport};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::bundle;
use crate::db::{InsertedRecords, PageRepository, PluginRepository};

use self::saga::{InstallSaga, SagaStep};

pub mod metadata;
mod saga;

/// Map repository errors into the lifecycle taxonomy
fn db_err(e: anyhow::Error) -> LifecycleError {
    LifecycleError::Database(e.to_string())
}

/// Fallback shared base when neither the caller nor the config names one
fn default_base_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".focusflow").join("plugins"))
        .unwrap_or_else(|| PathBuf::from(".focusflow/plugins"))
}

/// Lifecycle manager for the FocusFlow plugin
///
/// One instance per operation is cheap: repositories are created on demand
/// from the shared pool and all metadata is static.
pub struct Installer {
    descriptor: PluginDescriptor,
    modules: Vec<ModuleDescriptor>,
    pool: SqlitePool,
    shared_dir: PathBuf,
    source_dir: PathBuf,
}

impl Installer {
    /// Create an installer staging into `<base>/shared/<slug>/<version>`
    ///
    /// The bundle source defaults to the current directory, which is where
    /// the CLI runs from inside a plugin checkout.
    pub fn new(pool: SqlitePool, base_dir: Option<&Path>) -> Self {
        let descriptor = metadata::plugin_descriptor();
        let base = base_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(default_base_dir);
        let shared_dir =
            bundle::shared_path(&base, &descriptor.plugin_slug, &descriptor.version_dir());

        Self {
            modules: metadata::module_descriptors(),
            pool,
            shared_dir,
            source_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            descriptor,
        }
    }

    /// Override the directory the bundle is copied from
    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    /// Shared directory this installer stages into
    pub fn shared_dir(&self) -> &Path {
        &self.shared_dir
    }

    fn plugins(&self) -> PluginRepository {
        PluginRepository::new(self.pool.clone())
    }

    fn pages(&self) -> PageRepository {
        PageRepository::new(self.pool.clone())
    }

    async fn run_install(
        &self,
        user_id: &str,
        plugins: &PluginRepository,
        pages: &PageRepository,
        saga: &mut InstallSaga,
    ) -> Result<InstallReport, LifecycleError> {
        // Stage the bundle. Remember whether this call created the shared
        // directory so unwinding never deletes files staged by an earlier
        // install of the same version.
        let created = !self.shared_dir.exists();
        let summary = bundle::copy_bundle(&self.source_dir, &self.shared_dir).await?;
        saga.record(SagaStep::BundleStaged {
            shared_dir: self.shared_dir.clone(),
            created,
        });
        info!(
            files = summary.copied.len(),
            dir = %self.shared_dir.display(),
            "Staged bundle"
        );

        let inserted = plugins
            .insert_records(user_id, &self.descriptor, &self.modules)
            .await
            .map_err(db_err)?;
        saga.record(SagaStep::RecordsInserted {
            user_id: user_id.to_string(),
            plugin_id: inserted.plugin_id.clone(),
        });

        // The commit must be visible through the same existence check other
        // operations gate on before the install counts.
        if !self.is_installed(user_id).await? {
            return Err(LifecycleError::Verification(format!(
                "plugin row {} not visible after insert",
                inserted.plugin_id
            )));
        }

        let (page_id, page_created) = self
            .create_page(user_id, &inserted, plugins, pages, saga)
            .await?;

        // Final re-check after the last step; anything less than a visible
        // plugin row means the install did not take and must be unwound.
        if !self.is_installed(user_id).await? {
            return Err(LifecycleError::Verification(
                "installation verification failed".to_string(),
            ));
        }

        info!(
            user_id = %user_id,
            plugin_id = %inserted.plugin_id,
            modules = inserted.module_ids.len(),
            page_created,
            "Installed plugin"
        );

        Ok(InstallReport {
            success: true,
            error: None,
            plugin_id: Some(inserted.plugin_id),
            plugin_slug: Some(self.descriptor.plugin_slug.clone()),
            plugin_name: Some(self.descriptor.name.clone()),
            modules_created: inserted.module_ids,
            page_id: Some(page_id),
            page_created,
            files_copied: summary.copied.len(),
        })
    }

    /// Create the host page for this user, unless the route already has one
    async fn create_page(
        &self,
        user_id: &str,
        inserted: &InsertedRecords,
        plugins: &PluginRepository,
        pages: &PageRepository,
        saga: &mut InstallSaga,
    ) -> Result<(String, bool), LifecycleError> {
        if let Some(existing) = pages
            .find_by_route(user_id, metadata::PAGE_ROUTE)
            .await
            .map_err(db_err)?
        {
            info!(page_id = %existing, route = metadata::PAGE_ROUTE, "Page already exists, keeping it");
            return Ok((existing, false));
        }

        let module = self.modules.first().ok_or_else(|| {
            LifecycleError::Verification("no modules registered for page generation".to_string())
        })?;
        let module_id = self
            .resolve_module_id(user_id, inserted, &module.name, plugins)
            .await?;

        let content = self.page_content(user_id, &module_id, &module.display_name);
        let page_id = pages
            .insert_page(user_id, metadata::PAGE_NAME, metadata::PAGE_ROUTE, &content)
            .await
            .map_err(db_err)?;
        saga.record(SagaStep::PageCreated {
            creator_id: user_id.to_string(),
            route: metadata::PAGE_ROUTE.to_string(),
        });

        Ok((page_id, true))
    }

    /// Pick the module's record id out of the insert result, falling back to
    /// a database lookup when the suffix match finds nothing
    async fn resolve_module_id(
        &self,
        user_id: &str,
        inserted: &InsertedRecords,
        module_name: &str,
        plugins: &PluginRepository,
    ) -> Result<String, LifecycleError> {
        let suffix = format!("_{}", module_name);
        if let Some(id) = inserted.module_ids.iter().find(|id| id.ends_with(&suffix)) {
            return Ok(id.clone());
        }

        plugins
            .module_id_for(user_id, &inserted.plugin_id, module_name)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                LifecycleError::Verification(format!(
                    "module record {} not found for page generation",
                    module_name
                ))
            })
    }

    /// Build the page content: one cell per viewport class, full-width on
    /// desktop, compact on tablet and mobile
    fn page_content(&self, user_id: &str, module_id: &str, display_name: &str) -> PageContent {
        let plugin_id = self.descriptor.record_id(user_id);
        let stamp = chrono::Utc::now().timestamp_millis();
        let cell = |w: i64, h: i64| LayoutCell {
            i: format!("{}_{}_{}", self.descriptor.plugin_slug, module_id, stamp),
            x: 0,
            y: 0,
            w,
            h,
            plugin_id: plugin_id.clone(),
            args: CellArgs {
                module_id: module_id.to_string(),
                display_name: display_name.to_string(),
            },
        };

        PageContent {
            layouts: PageLayouts {
                desktop: vec![cell(12, 10)],
                tablet: vec![cell(4, 6)],
                mobile: vec![cell(4, 6)],
            },
            modules: Default::default(),
        }
    }
}

#[async_trait]
impl PluginLifecycle for Installer {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    async fn is_installed(&self, user_id: &str) -> Result<bool, LifecycleError> {
        let record = self
            .plugins()
            .find_for_user(user_id, &self.descriptor.plugin_slug)
            .await
            .map_err(db_err)?;
        Ok(record.is_some())
    }

    async fn perform_install(&self, user_id: &str) -> Result<InstallReport, LifecycleError> {
        let plugins = self.plugins();
        let pages = self.pages();
        let mut saga = InstallSaga::new();

        match self.run_install(user_id, &plugins, &pages, &mut saga).await {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Install failed, compensating completed steps");
                saga.unwind(&plugins, &pages).await;
                Err(e)
            }
        }
    }

    /// Delete the page, then the module and plugin rows
    ///
    /// Staged bundle files stay on disk: the shared directory is keyed by
    /// version, not user, and other installations may reference it.
    async fn perform_uninstall(&self, user_id: &str) -> Result<UninstallReport, LifecycleError> {
        let plugins = self.plugins();
        let pages = self.pages();

        let record = plugins
            .find_for_user(user_id, &self.descriptor.plugin_slug)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LifecycleError::NotFound(user_id.to_string()))?;

        let page_deleted = pages
            .delete_by_route(user_id, metadata::PAGE_ROUTE)
            .await
            .map_err(db_err)?
            > 0;

        let deleted = plugins
            .delete_records(user_id, &record.id)
            .await
            .map_err(db_err)?;

        info!(
            user_id = %user_id,
            plugin_id = %record.id,
            modules = deleted.modules,
            page_deleted,
            "Uninstalled plugin"
        );

        Ok(UninstallReport {
            success: true,
            error: None,
            plugin_id: Some(record.id),
            modules_deleted: deleted.modules,
            page_deleted,
        })
    }

    async fn current_status(&self, user_id: &str) -> Result<StatusReport, LifecycleError> {
        let record = self
            .plugins()
            .find_for_user(user_id, &self.descriptor.plugin_slug)
            .await
            .map_err(db_err)?;

        let Some(record) = record else {
            return Ok(StatusReport::not_installed());
        };

        let health =
            bundle::health_check(&self.shared_dir, &self.descriptor.bundle_location).await;
        let status = if health.is_healthy() {
            InstallStatus::Healthy
        } else {
            InstallStatus::Unhealthy
        };

        Ok(StatusReport {
            exists: true,
            status,
            plugin_id: Some(record.id.clone()),
            plugin: Some(PluginInfo {
                id: record.id,
                name: record.name,
                version: record.version,
                enabled: record.enabled,
                created_at: record.created_at,
                updated_at: record.updated_at,
            }),
            health: Some(health),
            error: None,
        })
    }
}

/// Install FocusFlow for a user
///
/// Never returns an error: failures are logged and folded into the report.
pub async fn install_plugin(
    user_id: &str,
    pool: &SqlitePool,
    base_dir: Option<&Path>,
) -> InstallReport {
    let installer = Installer::new(pool.clone(), base_dir);
    match installer.install_for_user(user_id).await {
        Ok(report) => report,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Install failed");
            InstallReport::failure(&e)
        }
    }
}

/// Uninstall FocusFlow for a user
///
/// Never returns an error: failures are logged and folded into the report.
pub async fn delete_plugin(
    user_id: &str,
    pool: &SqlitePool,
    base_dir: Option<&Path>,
) -> UninstallReport {
    let installer = Installer::new(pool.clone(), base_dir);
    match installer.uninstall_for_user(user_id).await {
        Ok(report) => report,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Uninstall failed");
            UninstallReport::failure(&e)
        }
    }
}

/// Report installation state and bundle health for a user
///
/// Never returns an error: failures are logged and folded into the report.
pub async fn get_plugin_status(
    user_id: &str,
    pool: &SqlitePool,
    base_dir: Option<&Path>,
) -> StatusReport {
    let installer = Installer::new(pool.clone(), base_dir);
    match installer.current_status(user_id).await {
        Ok(report) => report,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Status check failed");
            StatusReport::failure(&e)
        }
    }
}
