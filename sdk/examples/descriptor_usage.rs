//! Example demonstrating descriptor and report types

use sdk::{
    CellArgs, ConfigField, InstallReport, LayoutCell, LifecycleError, LifecycleErrorExt,
    ModuleLayout, PluginDescriptor,
};
use serde_json::json;

fn main() {
    // Example 1: A plugin descriptor and its per-user record id
    let plugin = PluginDescriptor {
        name: "FocusFlow".to_string(),
        description: "Guided focus sessions".to_string(),
        version: "1.2.0".to_string(),
        plugin_type: "frontend".to_string(),
        icon: "Timer".to_string(),
        category: "productivity".to_string(),
        official: true,
        author: "FocusFlow Team".to_string(),
        compatibility: "1.0.0".to_string(),
        scope: "FocusFlow".to_string(),
        bundle_method: "webpack".to_string(),
        bundle_location: "dist/remoteEntry.js".to_string(),
        is_local: true,
        long_description: "Pomodoro-style focus session coach".to_string(),
        plugin_slug: "FocusFlow".to_string(),
        source_type: "local".to_string(),
        source_url: "local://FocusFlow".to_string(),
        update_check_url: String::new(),
        installation_type: "prebuilt".to_string(),
        permissions: vec!["api.access".to_string()],
    };

    println!("Record id for user-1: {}", plugin.record_id("user-1"));
    println!("Shared version dir:   {}", plugin.version_dir());

    // Example 2: Layout constraints serialize with camelCase keys
    let layout = ModuleLayout {
        min_width: 4,
        min_height: 4,
        default_width: 8,
        default_height: 6,
    };
    println!("Layout JSON: {}", serde_json::to_string(&layout).unwrap());

    // Example 3: A config field with a typed default
    let field = ConfigField {
        field_type: "number".to_string(),
        description: "Minutes per focus session".to_string(),
        default: json!(25),
    };
    println!("Config field JSON: {}", serde_json::to_string(&field).unwrap());

    // Example 4: A page layout cell as the host renderer sees it
    let cell = LayoutCell {
        i: "FocusFlow_user-1_FocusFlow_FocusFlow_1700000000000".to_string(),
        x: 0,
        y: 0,
        w: 12,
        h: 10,
        plugin_id: plugin.record_id("user-1"),
        args: CellArgs {
            module_id: "user-1_FocusFlow_FocusFlow".to_string(),
            display_name: "Focus Session Coach".to_string(),
        },
    };
    println!("Cell JSON: {}", serde_json::to_string(&cell).unwrap());

    // Example 5: Errors fold into reports at the operation boundary
    let err = LifecycleError::AlreadyInstalled(plugin.record_id("user-1"));
    let report = InstallReport::failure(&err);
    println!("\nFailure report: {}", serde_json::to_string_pretty(&report).unwrap());
    println!("Hint for the user: {}", err.user_hint());
    println!("Recoverable: {}", err.is_recoverable());
}
