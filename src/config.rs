//! Family tree configuration
//!
//! Loads layout, cascade, viewport, hierarchy and branch settings from YAML.
//! Every section falls back to defaults, so a partial file (or none at all)
//! is valid. See `config/family_tree.yaml` for a commented sample.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use family_types::{BranchId, FOUNDER_BRANCH};

use crate::layout::Orientation;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub layout: LayoutConfig,
    pub cascade: CascadeConfig,
    pub viewport: ViewportConfig,
    pub hierarchy: HierarchyConfig,
    pub branches: BranchConfig,
}

impl ForestConfig {
    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Node geometry and spacing used by the bottom-up layout pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a single member box
    pub node_width: f32,
    /// Height of a single member box
    pub node_height: f32,
    /// Distance between the centers of a member box and its spouse box
    pub spouse_offset: f32,
    /// Vertical distance between generations
    pub level_height: f32,
    /// Minimum horizontal gap between neighbouring subtrees
    pub sibling_gap: f32,
    pub orientation: Orientation,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 100.0,
            node_height: 50.0,
            spouse_offset: 115.0,
            level_height: 120.0,
            sibling_gap: 30.0,
            orientation: Orientation::Vertical,
        }
    }
}

impl LayoutConfig {
    /// Horizontal footprint of a member, including the spouse slot when present
    pub fn slot_width(&self, has_spouse: bool) -> f32 {
        if has_spouse {
            self.node_width + self.spouse_offset
        } else {
            self.node_width
        }
    }
}

/// Timing of the level-by-level reveal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Delay between two revealed levels, in milliseconds
    pub level_delay_ms: u64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self { level_delay_ms: 700 }
    }
}

impl CascadeConfig {
    pub fn level_delay(&self) -> Duration {
        Duration::from_millis(self.level_delay_ms)
    }
}

/// Viewport fitting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Available drawing width in logical pixels
    pub width: f32,
    /// Available drawing height in logical pixels
    pub height: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Share of the viewport the content may fill (0.9 = 10% margin)
    pub fit_margin: f32,
    /// Padding added around the content bounding box
    pub padding: f32,
    /// Distance from the top edge to the top of the content
    pub top_margin: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            min_zoom: 0.3,
            max_zoom: 3.0,
            fit_margin: 0.9,
            padding: 20.0,
            top_margin: 60.0,
        }
    }
}

/// Recursion limits for hierarchy building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Hard cap on tree depth; guards against malformed parent chains
    pub max_depth: u32,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Display labels for branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    /// Label per branch id
    pub labels: BTreeMap<BranchId, String>,
    /// Label for the founder's branch
    pub founder_label: String,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            labels: BTreeMap::new(),
            founder_label: "Founder".to_string(),
        }
    }
}

impl BranchConfig {
    /// Label for a branch. The founder's branch uses `founder_label`; other
    /// branches without a configured label are named after their id.
    pub fn label(&self, branch: BranchId) -> Cow<'_, str> {
        if branch == FOUNDER_BRANCH {
            return Cow::Borrowed(&self.founder_label);
        }
        match self.labels.get(&branch) {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(format!("Branch {}", branch)),
        }
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseError(String),
}
