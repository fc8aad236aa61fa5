//! Page content wire types
//!
//! A generated plugin page stores its layout as JSON in the host's
//! `pages.content` column: one cell list per viewport class, plus a `modules`
//! object the host page editor fills in after the fact. Field names follow
//! the host renderer's camelCase convention.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root of the `pages.content` JSON column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    pub layouts: PageLayouts,
    #[serde(default)]
    pub modules: Map<String, Value>,
}

impl PageContent {
    /// Parse page content from its stored JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize page content for the `content` column
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Cell placement per viewport class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLayouts {
    pub desktop: Vec<LayoutCell>,
    pub tablet: Vec<LayoutCell>,
    pub mobile: Vec<LayoutCell>,
}

/// One placed module cell in a page layout
///
/// `i` is the cell key, unique within the page. The renderer uses it as the
/// React list key, so two cells on one page must never collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCell {
    pub i: String,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub plugin_id: String,
    pub args: CellArgs,
}

/// Module reference carried by a layout cell
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellArgs {
    pub module_id: String,
    pub display_name: String,
}
