//! Style configuration objects
//!
//! The core does not interpret style beyond what its rewrites need; these are
//! opaque value objects supplied by the calling framework's style detection
//! and passed through. Serde derives keep them loadable from project
//! configuration the way the rest of the stack does it.

use serde::{Deserialize, Serialize};

/// Import layout preferences consulted by the import rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportLayoutStyle {
    /// Fold imports from one package into a star import once this many
    /// names are imported from it
    pub name_count_to_use_star_import: usize,
    pub property_count_to_use_star_import: usize,
}

impl Default for ImportLayoutStyle {
    fn default() -> Self {
        Self {
            name_count_to_use_star_import: 5,
            property_count_to_use_star_import: 3,
        }
    }
}

/// Indentation preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabsAndIndentsStyle {
    pub use_tab_character: bool,
    pub tab_size: u32,
    pub indent_size: u32,
    pub continuation_indent: u32,
}

impl Default for TabsAndIndentsStyle {
    fn default() -> Self {
        Self {
            use_tab_character: false,
            tab_size: 4,
            indent_size: 4,
            continuation_indent: 8,
        }
    }
}
