//! Visualizer Configuration
//!
//! Traversal bounds for the graph builder and geometry constants for the
//! layout engine. Every field has a default, so a host only needs to spell
//! out what it changes:
//!
//! ```json
//! { "layout": { "row_height": 20.0 }, "builder": { "max_depth": 8 } }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub builder: BuilderConfig,
    pub layout: LayoutConfig,
}

impl VisualizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Bounds on how much of the heap a single build may pull in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Expanded edges deeper than this below the root are left unresolved.
    pub max_depth: usize,
    /// Upper bound on nodes created by one build.
    pub max_nodes: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 2048,
        }
    }
}

/// Geometry constants of the tree layout, in device-independent pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of the node caption showing the type name.
    pub header_height: f64,
    /// Height of one property or content row.
    pub row_height: f64,
    /// Approximate advance of one character of row text.
    pub char_width: f64,
    /// Horizontal padding inside a node box, per side.
    pub node_padding: f64,
    pub min_node_width: f64,
    /// Gap between sibling subtrees along the secondary axis.
    pub sibling_spacing: f64,
    /// Gap between a parent and its children along the primary axis.
    pub layer_gap: f64,
    /// Length of the straight segment leaving a row before an edge bends.
    pub edge_stub: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_height: 24.0,
            row_height: 18.0,
            char_width: 7.0,
            node_padding: 8.0,
            min_node_width: 80.0,
            sibling_spacing: 24.0,
            layer_gap: 48.0,
            edge_stub: 12.0,
        }
    }
}
