//! Viewport fit
//!
//! After every layout pass the visible content is re-centered: the root's
//! partnership center goes to the middle of the viewport and the zoom is
//! chosen so the padded bounding box fits, clamped to the configured range.

use emath::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::{LayoutConfig, ViewportConfig};

use super::{Orientation, VisibleNode};

/// Transform from layout coordinates to screen coordinates:
/// `screen = layout × scale + translate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl ViewportTransform {
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }
}

/// Fit computation for one viewport size
#[derive(Debug, Clone)]
pub struct ViewportFit {
    config: ViewportConfig,
}

impl ViewportFit {
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.config.width = width;
        self.config.height = height;
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    /// Padded bounding box of every visible box, spouse boxes included
    pub fn content_bounds(&self, nodes: &[VisibleNode], layout: &LayoutConfig) -> Rect {
        let (half_w, half_h) = match layout.orientation {
            Orientation::Vertical | Orientation::Radial => {
                (layout.node_width / 2.0, layout.node_height / 2.0)
            }
            Orientation::Horizontal => (layout.node_height / 2.0, layout.node_width / 2.0),
        };
        let half = Vec2::new(half_w, half_h);

        let mut bounds = Rect::NOTHING;
        for node in nodes {
            let center = Pos2::new(node.box_x, node.box_y);
            bounds = bounds.union(Rect::from_center_size(center, half * 2.0));
            if let Some(spouse) = &node.spouse {
                let center = Pos2::new(spouse.x, spouse.y);
                bounds = bounds.union(Rect::from_center_size(center, half * 2.0));
            }
        }

        if bounds.is_negative() {
            return bounds;
        }
        bounds.expand(self.config.padding)
    }

    /// Fit the visible nodes, focusing the first root
    pub fn fit_nodes(&self, nodes: &[VisibleNode], layout: &LayoutConfig) -> ViewportTransform {
        let bounds = self.content_bounds(nodes, layout);
        let focus = nodes
            .first()
            .map(|root| Pos2::new(root.x, root.y))
            .unwrap_or_else(|| bounds.center());
        self.compute_from_bounds(bounds, focus, layout.orientation)
    }

    /// Scale to fit `bounds`, centering `focus` across the sibling axis.
    /// Radial content is scaled so `focus` can sit at the viewport center.
    pub fn compute_from_bounds(
        &self,
        bounds: Rect,
        focus: Pos2,
        orientation: Orientation,
    ) -> ViewportTransform {
        let size = self.size();
        if bounds.is_negative() || bounds.width() < 1.0 || bounds.height() < 1.0 {
            return ViewportTransform {
                scale: 1.0,
                translate_x: size.x / 2.0,
                translate_y: size.y / 2.0,
            };
        }

        if orientation == Orientation::Radial {
            let reach_x = (focus.x - bounds.min.x).max(bounds.max.x - focus.x).max(0.5);
            let reach_y = (focus.y - bounds.min.y).max(bounds.max.y - focus.y).max(0.5);
            let scale = self.clamp_zoom(
                (size.x * self.config.fit_margin / (2.0 * reach_x))
                    .min(size.y * self.config.fit_margin / (2.0 * reach_y)),
            );
            return ViewportTransform {
                scale,
                translate_x: size.x / 2.0 - focus.x * scale,
                translate_y: size.y / 2.0 - focus.y * scale,
            };
        }

        let zoom_x = (size.x * self.config.fit_margin) / bounds.width();
        let zoom_y = (size.y * self.config.fit_margin) / bounds.height();
        let scale = self.clamp_zoom(zoom_x.min(zoom_y));

        match orientation {
            Orientation::Horizontal => ViewportTransform {
                scale,
                translate_x: self.config.top_margin - bounds.min.x * scale,
                translate_y: size.y / 2.0 - focus.y * scale,
            },
            Orientation::Vertical | Orientation::Radial => ViewportTransform {
                scale,
                translate_x: size.x / 2.0 - focus.x * scale,
                translate_y: self.config.top_margin - bounds.min.y * scale,
            },
        }
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.config.min_zoom, self.config.max_zoom)
    }
}
