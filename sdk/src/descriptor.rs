//! Typed plugin and module descriptors
//!
//! The host persists plugin metadata into relational rows with JSON columns.
//! These structs are the typed source of truth a lifecycle manager serializes
//! from, so a typo in a field name fails at compile time instead of surfacing
//! as a malformed row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Static plugin metadata
///
/// One descriptor per plugin distribution. Everything here is
/// installation-independent; per-user state (record ids, timestamps, enabled
/// flags) is derived at install time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub icon: String,
    pub category: String,
    pub official: bool,
    pub author: String,
    pub compatibility: String,
    pub scope: String,
    pub bundle_method: String,
    /// Entry point of the built bundle, relative to the bundle root
    pub bundle_location: String,
    pub is_local: bool,
    pub long_description: String,
    pub plugin_slug: String,
    pub source_type: String,
    pub source_url: String,
    pub update_check_url: String,
    pub installation_type: String,
    pub permissions: Vec<String>,
}

impl PluginDescriptor {
    /// Database id of this plugin's record for a user
    ///
    /// Record ids are deterministic so repeated lookups never need a stored
    /// mapping: `{user_id}_{plugin_slug}`.
    pub fn record_id(&self, user_id: &str) -> String {
        format!("{}_{}", user_id, self.plugin_slug)
    }

    /// Version directory name used under the shared bundle path
    pub fn version_dir(&self) -> String {
        format!("v{}", self.version)
    }
}

/// Static module metadata
///
/// A plugin registers one or more modules; each becomes a row in the host's
/// `module` table with the JSON columns serialized from the typed fields
/// below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub priority: i64,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub config_fields: BTreeMap<String, ConfigField>,
    #[serde(default)]
    pub messages: Map<String, Value>,
    #[serde(default)]
    pub required_services: BTreeMap<String, ServiceRequirement>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub layout: ModuleLayout,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ModuleDescriptor {
    /// Database id of this module's record for a user
    ///
    /// `{user_id}_{plugin_slug}_{module_name}`, matching the suffix rule the
    /// page generator uses to pick a module id out of an install result.
    pub fn record_id(&self, user_id: &str, plugin_slug: &str) -> String {
        format!("{}_{}_{}", user_id, plugin_slug, self.name)
    }
}

/// One user-configurable module setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub description: String,
    pub default: Value,
}

/// A host service the module calls, with the methods it needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequirement {
    pub methods: Vec<String>,
    pub version: String,
}

/// Grid sizing constraints for a module
///
/// Serialized with camelCase keys because the host's page renderer reads the
/// `layout` JSON column directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleLayout {
    pub min_width: i64,
    pub min_height: i64,
    pub default_width: i64,
    pub default_height: i64,
}
