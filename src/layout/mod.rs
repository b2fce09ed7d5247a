//! Collapsible tree layout
//!
//! - [`tree`]: per-node expansion state over the resolved forest
//! - [`engine`]: bottom-up positioning and edge routing of the visible tree
//! - [`viewport`]: fit transform that centers the visible content
//! - [`cascade`]: delayed level-by-level reveal
//!
//! The types in this module are the output boundary handed to renderers.

pub mod cascade;
pub mod engine;
pub mod tree;
pub mod viewport;

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use family_types::MemberId;

pub use cascade::{CascadeReveal, CascadeStep, DelayQueue};
pub use engine::LayoutEngine;
pub use tree::{LayoutNode, LayoutTree, NodeIdx, NodeState};
pub use viewport::{ViewportFit, ViewportTransform};

// =============================================================================
// ORIENTATION
// =============================================================================

/// Direction in which generations flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Generations flow top-to-bottom, siblings left-to-right
    #[default]
    Vertical,
    /// Generations flow left-to-right, siblings top-to-bottom
    Horizontal,
    /// Generations are rings around the root, siblings spread by angle
    Radial,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown orientation '{0}', expected vertical, horizontal or radial")]
pub struct UnknownOrientation(pub String);

impl FromStr for Orientation {
    type Err = UnknownOrientation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vertical" => Ok(Orientation::Vertical),
            "horizontal" => Ok(Orientation::Horizontal),
            "radial" => Ok(Orientation::Radial),
            _ => Err(UnknownOrientation(s.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Orientation {
    /// Name as written in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
            Orientation::Radial => "radial",
        }
    }

    /// Map layout coordinates (x across a generation, y down the generations)
    /// to output coordinates.
    ///
    /// `extent` is the laid-out width across generations. Radial wraps it
    /// onto one full turn starting at twelve o'clock and uses `y` as the
    /// radius, so the root lands on the origin.
    pub fn orient(&self, x: f32, y: f32, extent: f32) -> (f32, f32) {
        match self {
            Orientation::Vertical => (x, y),
            Orientation::Horizontal => (y, x),
            Orientation::Radial => {
                let angle = if extent > 0.0 { x / extent * TAU } else { 0.0 };
                (y * angle.sin(), -y * angle.cos())
            }
        }
    }
}

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// Public projection of a node's expansion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionState {
    Expanded,
    Collapsed,
    /// No children; offers no toggle
    Leaf,
}

impl ExpansionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionState::Expanded => "expanded",
            ExpansionState::Collapsed => "collapsed",
            ExpansionState::Leaf => "leaf",
        }
    }

    pub fn is_toggleable(&self) -> bool {
        !matches!(self, ExpansionState::Leaf)
    }
}

/// Box of a married-in partner drawn beside its node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseBox {
    pub id: MemberId,
    pub label: String,
    pub is_deceased: bool,
    pub x: f32,
    pub y: f32,
}

/// A visible node, positioned in output coordinates.
///
/// `x`/`y` is the center of the node box, or the center of the partnership
/// when a spouse is attached; the individual boxes are in `box_x`/`box_y`
/// and `spouse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleNode {
    pub id: MemberId,
    pub x: f32,
    pub y: f32,
    /// Center of the member's own box
    pub box_x: f32,
    pub box_y: f32,
    pub label: String,
    pub is_deceased: bool,
    pub has_attached_spouse: bool,
    pub expansion_state: ExpansionState,
    pub depth: u32,
    pub spouse: Option<SpouseBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Partnership center to a child's box
    ParentChild,
    /// Horizontal connector between partner boxes
    Spouse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEdge {
    pub from_id: MemberId,
    pub to_id: MemberId,
    pub source_x: f32,
    pub source_y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub kind: EdgeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_str() {
        assert_eq!("horizontal".parse::<Orientation>(), Ok(Orientation::Horizontal));
        assert_eq!(" Radial ".parse::<Orientation>(), Ok(Orientation::Radial));
        assert_eq!("VERTICAL".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert_eq!(
            "diagonal".parse::<Orientation>(),
            Err(UnknownOrientation("diagonal".to_string()))
        );
        assert_eq!(Orientation::Radial.to_string(), "radial");
        assert_eq!(
            serde_json::to_value(Orientation::Horizontal).unwrap(),
            Orientation::Horizontal.as_str()
        );
    }

    #[test]
    fn test_orient_swaps_axes() {
        assert_eq!(Orientation::Vertical.orient(10.0, 120.0, 400.0), (10.0, 120.0));
        assert_eq!(Orientation::Horizontal.orient(10.0, 120.0, 400.0), (120.0, 10.0));
    }

    #[test]
    fn test_orient_radial() {
        let close = |(x, y): (f32, f32), (ex, ey): (f32, f32)| {
            (x - ex).abs() < 1e-3 && (y - ey).abs() < 1e-3
        };
        let radial = Orientation::Radial;

        // Depth 0 is the center whatever the angle
        assert!(close(radial.orient(300.0, 0.0, 400.0), (0.0, 0.0)));
        // Start of the extent points up, a quarter turn points right
        assert!(close(radial.orient(0.0, 120.0, 400.0), (0.0, -120.0)));
        assert!(close(radial.orient(100.0, 120.0, 400.0), (120.0, 0.0)));
        assert!(close(radial.orient(200.0, 240.0, 400.0), (0.0, 240.0)));
        // Degenerate extent keeps the radius
        assert!(close(radial.orient(50.0, 120.0, 0.0), (0.0, -120.0)));
    }

    #[test]
    fn test_output_serializes_camel_case() {
        let edge = TreeEdge {
            from_id: MemberId::from("f"),
            to_id: MemberId::from("c"),
            source_x: 0.0,
            source_y: 25.0,
            target_x: 0.0,
            target_y: 95.0,
            kind: EdgeKind::ParentChild,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["fromId"], "f");
        assert_eq!(json["sourceY"], 25.0);
        assert_eq!(json["kind"], "parent_child");
        assert_eq!(
            serde_json::to_value(ExpansionState::Collapsed).unwrap(),
            "collapsed"
        );
    }
}
