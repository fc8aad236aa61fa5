/// Plugin and module record operations
///
/// This module writes and deletes the rows an installation leaves in the
/// host's `plugin` and `module` tables. All queries are parameterized, and
/// record creation and deletion each run inside a single transaction so a
/// failure never leaves a plugin row without its modules or vice versa.
use anyhow::{Context, Result};
use sdk::descriptor::{ModuleDescriptor, PluginDescriptor};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use super::now_timestamp;

/// Summary of a persisted plugin row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub plugin_slug: String,
}

/// Ids created by a successful record insertion
#[derive(Debug, Clone)]
pub struct InsertedRecords {
    pub plugin_id: String,
    pub module_ids: Vec<String>,
}

/// Row counts removed by a record deletion
#[derive(Debug, Clone, Copy)]
pub struct DeletedRecords {
    pub modules: u64,
    pub plugin: u64,
}

/// Repository for plugin and module rows
pub struct PluginRepository {
    pool: SqlitePool,
}

impl PluginRepository {
    /// Create a new plugin repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up the plugin row for a user by slug
    ///
    /// This is the persisted existence check every lifecycle operation gates
    /// on; a `Some` result means the plugin is installed for that user.
    pub async fn find_for_user(
        &self,
        user_id: &str,
        plugin_slug: &str,
    ) -> Result<Option<PluginRecord>> {
        let row = sqlx::query(
            "SELECT id, name, version, enabled, created_at, updated_at, plugin_slug \
             FROM plugin WHERE user_id = ? AND plugin_slug = ?",
        )
        .bind(user_id)
        .bind(plugin_slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch plugin record")?;

        Ok(row.map(|r| PluginRecord {
            id: r.get("id"),
            name: r.get("name"),
            version: r.get("version"),
            enabled: r.get("enabled"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
            plugin_slug: r.get("plugin_slug"),
        }))
    }

    /// Insert the plugin row and all module rows for a user
    ///
    /// Runs in one transaction: either the plugin and every module land
    /// together or nothing is written. Ids are derived from the descriptors
    /// (`{user}_{slug}` and `{user}_{slug}_{module}`).
    pub async fn insert_records(
        &self,
        user_id: &str,
        descriptor: &PluginDescriptor,
        modules: &[ModuleDescriptor],
    ) -> Result<InsertedRecords> {
        let now = now_timestamp();
        let plugin_id = descriptor.record_id(user_id);
        let permissions = serde_json::to_string(&descriptor.permissions)
            .context("Failed to serialize plugin permissions")?;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin insert transaction")?;

        sqlx::query(
            "INSERT INTO plugin (
                id, name, description, version, type, enabled, icon, category,
                status, official, author, last_updated, compatibility, downloads,
                scope, bundle_method, bundle_location, is_local, long_description,
                config_fields, messages, dependencies, created_at, updated_at,
                user_id, plugin_slug, source_type, source_url, update_check_url,
                last_update_check, update_available, latest_version,
                installation_type, permissions
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&plugin_id)
        .bind(&descriptor.name)
        .bind(&descriptor.description)
        .bind(&descriptor.version)
        .bind(&descriptor.plugin_type)
        .bind(true)
        .bind(&descriptor.icon)
        .bind(&descriptor.category)
        .bind("activated")
        .bind(descriptor.official)
        .bind(&descriptor.author)
        .bind(&now)
        .bind(&descriptor.compatibility)
        .bind(0i64)
        .bind(&descriptor.scope)
        .bind(&descriptor.bundle_method)
        .bind(&descriptor.bundle_location)
        .bind(descriptor.is_local)
        .bind(&descriptor.long_description)
        .bind("{}")
        .bind(Option::<String>::None)
        .bind(Option::<String>::None)
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .bind(&descriptor.plugin_slug)
        .bind(&descriptor.source_type)
        .bind(&descriptor.source_url)
        .bind(&descriptor.update_check_url)
        .bind(Option::<String>::None)
        .bind(false)
        .bind(Option::<String>::None)
        .bind(&descriptor.installation_type)
        .bind(&permissions)
        .execute(&mut *tx)
        .await
        .context("Failed to insert plugin record")?;

        let mut module_ids = Vec::with_capacity(modules.len());

        for module in modules {
            let module_id = module.record_id(user_id, &descriptor.plugin_slug);

            sqlx::query(
                "INSERT INTO module (
                    id, plugin_id, name, display_name, description, icon, category,
                    enabled, priority, props, config_fields, messages,
                    required_services, dependencies, layout, tags,
                    created_at, updated_at, user_id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&module_id)
            .bind(&plugin_id)
            .bind(&module.name)
            .bind(&module.display_name)
            .bind(&module.description)
            .bind(&module.icon)
            .bind(&module.category)
            .bind(true)
            .bind(module.priority)
            .bind(serde_json::to_string(&module.props)?)
            .bind(serde_json::to_string(&module.config_fields)?)
            .bind(serde_json::to_string(&module.messages)?)
            .bind(serde_json::to_string(&module.required_services)?)
            .bind(serde_json::to_string(&module.dependencies)?)
            .bind(serde_json::to_string(&module.layout)?)
            .bind(serde_json::to_string(&module.tags)?)
            .bind(&now)
            .bind(&now)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert module record {}", module_id))?;

            module_ids.push(module_id);
        }

        tx.commit()
            .await
            .context("Failed to commit record insertion")?;

        Ok(InsertedRecords {
            plugin_id,
            module_ids,
        })
    }

    /// Delete the module rows and plugin row for a user
    ///
    /// Module rows go first, then the plugin row, in one transaction. If the
    /// plugin row turns out to be missing the module deletes are rolled back
    /// so a racing uninstall cannot strip modules from a surviving plugin.
    pub async fn delete_records(&self, user_id: &str, plugin_id: &str) -> Result<DeletedRecords> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin delete transaction")?;

        let modules = sqlx::query("DELETE FROM module WHERE plugin_id = ? AND user_id = ?")
            .bind(plugin_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete module records")?
            .rows_affected();

        let plugin = sqlx::query("DELETE FROM plugin WHERE id = ? AND user_id = ?")
            .bind(plugin_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete plugin record")?
            .rows_affected();

        if plugin == 0 {
            // Dropping the uncommitted transaction rolls back the module deletes
            anyhow::bail!("Plugin record {} not found during deletion", plugin_id);
        }

        tx.commit()
            .await
            .context("Failed to commit record deletion")?;

        Ok(DeletedRecords { modules, plugin })
    }

    /// Resolve a module record id by module name
    ///
    /// Fallback used by page generation when the module id cannot be picked
    /// out of the install result by suffix.
    pub async fn module_id_for(
        &self,
        user_id: &str,
        plugin_id: &str,
        module_name: &str,
    ) -> Result<Option<String>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM module WHERE plugin_id = ? AND user_id = ? AND name = ?")
                .bind(plugin_id)
                .bind(user_id)
                .bind(module_name)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to resolve module id")?;

        Ok(id)
    }

    /// Count module rows attached to a plugin
    pub async fn count_modules(&self, user_id: &str, plugin_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM module WHERE plugin_id = ? AND user_id = ?")
                .bind(plugin_id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count module records")?;

        Ok(count)
    }
}
