//! Built-in FocusFlow metadata
//!
//! The descriptors here are the single source of truth for everything the
//! installer persists: record ids, shared-path layout, and the JSON columns
//! of the plugin and module rows all derive from these values.

use sdk::descriptor::{
    ConfigField, ModuleDescriptor, ModuleLayout, PluginDescriptor, ServiceRequirement,
};
use serde_json::{json, Map};
use std::collections::BTreeMap;

/// Display name of the generated host page
pub const PAGE_NAME: &str = "Focus Flow";

/// Route of the generated host page, unique per user
pub const PAGE_ROUTE: &str = "focus-flow";

/// Descriptor for the FocusFlow plugin distribution
pub fn plugin_descriptor() -> PluginDescriptor {
    PluginDescriptor {
        name: "FocusFlow".to_string(),
        description: "Structured focus sessions with timed breaks and a session log".to_string(),
        version: "1.2.0".to_string(),
        plugin_type: "frontend".to_string(),
        icon: "Timer".to_string(),
        category: "productivity".to_string(),
        official: false,
        author: "FocusFlow Team".to_string(),
        compatibility: "1.0.0".to_string(),
        scope: "FocusFlow".to_string(),
        bundle_method: "webpack".to_string(),
        bundle_location: "dist/remoteEntry.js".to_string(),
        is_local: false,
        long_description: "A focus-session coach for your dashboard. Run timed \
            focus blocks with guided breaks, keep a daily log of completed \
            sessions, and tune session lengths to your own rhythm."
            .to_string(),
        plugin_slug: "FocusFlow".to_string(),
        source_type: "github".to_string(),
        source_url: "https://github.com/focusflow-team/focusflow".to_string(),
        update_check_url: "https://github.com/focusflow-team/focusflow/releases/latest"
            .to_string(),
        installation_type: "remote".to_string(),
        permissions: vec!["api.access".to_string()],
    }
}

/// Descriptors for the modules FocusFlow registers
///
/// The first module is the one the generated page references.
pub fn module_descriptors() -> Vec<ModuleDescriptor> {
    let mut config_fields = BTreeMap::new();
    config_fields.insert(
        "focus_minutes".to_string(),
        ConfigField {
            field_type: "number".to_string(),
            description: "Length of a focus session in minutes".to_string(),
            default: json!(25),
        },
    );
    config_fields.insert(
        "break_minutes".to_string(),
        ConfigField {
            field_type: "number".to_string(),
            description: "Length of a break in minutes".to_string(),
            default: json!(5),
        },
    );
    config_fields.insert(
        "auto_log_sessions".to_string(),
        ConfigField {
            field_type: "boolean".to_string(),
            description: "Record completed sessions automatically".to_string(),
            default: json!(true),
        },
    );

    let mut required_services = BTreeMap::new();
    required_services.insert(
        "api".to_string(),
        ServiceRequirement {
            methods: vec!["get".to_string(), "post".to_string()],
            version: "1.0.0".to_string(),
        },
    );
    required_services.insert(
        "theme".to_string(),
        ServiceRequirement {
            methods: vec![
                "getCurrentTheme".to_string(),
                "addThemeChangeListener".to_string(),
                "removeThemeChangeListener".to_string(),
            ],
            version: "1.0.0".to_string(),
        },
    );
    required_services.insert(
        "pluginState".to_string(),
        ServiceRequirement {
            methods: vec!["save".to_string(), "load".to_string()],
            version: "1.0.0".to_string(),
        },
    );

    vec![ModuleDescriptor {
        name: "FocusFlow".to_string(),
        display_name: "Focus Session Coach".to_string(),
        description: "Timed focus sessions with guided breaks and a daily log".to_string(),
        icon: "Timer".to_string(),
        category: "productivity".to_string(),
        priority: 1,
        props: Map::new(),
        config_fields,
        messages: Map::new(),
        required_services,
        dependencies: vec![],
        layout: ModuleLayout {
            min_width: 4,
            min_height: 4,
            default_width: 8,
            default_height: 6,
        },
        tags: vec![
            "focus".to_string(),
            "pomodoro".to_string(),
            "productivity".to_string(),
        ],
    }]
}
