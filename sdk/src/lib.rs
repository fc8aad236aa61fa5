//! FocusFlow SDK
//!
//! Shared library providing the contract between the host application and
//! the FocusFlow plugin lifecycle manager: typed descriptors, page layout
//! wire types, the lifecycle dispatch trait, the error taxonomy, and
//! structured operation reports.

/// Plugin and module descriptor types
pub mod descriptor;

/// Error types and handling
pub mod errors;

/// Lifecycle dispatch trait
pub mod lifecycle;

/// Page content wire types
pub mod page;

/// Structured operation reports
pub mod reports;

// Re-export commonly used types
pub use descriptor::{
    ConfigField, ModuleDescriptor, ModuleLayout, PluginDescriptor, ServiceRequirement,
};
pub use errors::{LifecycleError, LifecycleErrorExt};
pub use lifecycle::PluginLifecycle;
pub use page::{CellArgs, LayoutCell, PageContent, PageLayouts};
pub use reports::{
    HealthDetails, InstallReport, InstallStatus, PluginInfo, StatusReport, UninstallReport,
    ValidationReport,
};
