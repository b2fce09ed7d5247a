//! Bottom-up positioning
//!
//! Packs the visible tree left to right with a running cursor:
//!
//! - a node without visible children takes the next slot at the cursor;
//! - a node with visible children is laid out after them, centered on their
//!   combined span; when its own slot would reach left of where its subtree
//!   started, the whole subtree shifts right;
//! - the cursor always ends past the widest part of the subtree plus the
//!   sibling gap, so sibling subtrees never overlap.
//!
//! `y` is always `depth × level_height`. A collapsed node is a leaf here no
//! matter how many children it hides.

use family_types::Member;

use crate::config::LayoutConfig;

use super::tree::{LayoutNode, LayoutTree, NodeIdx};
use super::{EdgeKind, SpouseBox, TreeEdge, VisibleNode};

/// Horizontal extent of a laid out subtree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f32,
    pub right: f32,
}

impl Span {
    fn around(center: f32, width: f32) -> Self {
        Self {
            left: center - width / 2.0,
            right: center + width / 2.0,
        }
    }

    fn union(self, other: Span) -> Self {
        Self {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
        }
    }

    fn shifted(self, dx: f32) -> Self {
        Self {
            left: self.left + dx,
            right: self.right + dx,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position every visible node. Returns the span of each root tree.
    pub fn layout(&self, tree: &mut LayoutTree) -> Vec<Span> {
        let mut cursor = 0.0;
        let roots = tree.roots().to_vec();
        let spans: Vec<Span> = roots
            .into_iter()
            .map(|root| self.place(tree, root, &mut cursor))
            .collect();
        tree.set_extent(cursor);

        tracing::debug!(
            roots = spans.len(),
            width = cursor,
            orientation = %self.config.orientation,
            "layout pass complete"
        );
        spans
    }

    fn place(&self, tree: &mut LayoutTree, idx: NodeIdx, cursor: &mut f32) -> Span {
        let Some(node) = tree.node(idx) else {
            return Span { left: *cursor, right: *cursor };
        };
        let slot = self.config.slot_width(node.has_spouse());
        let y = node.depth as f32 * self.config.level_height;
        let children = node.state.visible_children().to_vec();

        if children.is_empty() {
            let x = *cursor + slot / 2.0;
            *cursor += slot + self.config.sibling_gap;
            self.set_position(tree, idx, x, y);
            return Span::around(x, slot);
        }

        let start = *cursor;
        let mut span: Option<Span> = None;
        for child in children {
            let child_span = self.place(tree, child, cursor);
            span = Some(span.map_or(child_span, |s| s.union(child_span)));
        }
        let mut span = span.unwrap_or(Span { left: start, right: start });

        let mut x = (span.left + span.right) / 2.0;
        let overhang = start - (x - slot / 2.0);
        if overhang > 0.0 {
            self.shift_subtree(tree, idx, overhang);
            span = span.shifted(overhang);
            x += overhang;
        }

        self.set_position(tree, idx, x, y);
        let span = span.union(Span::around(x, slot));
        *cursor = cursor.max(span.right + self.config.sibling_gap);
        span
    }

    fn set_position(&self, tree: &mut LayoutTree, idx: NodeIdx, x: f32, y: f32) {
        if let Some(node) = tree.node_mut(idx) {
            node.x = x;
            node.y = y;
        }
    }

    /// Move the visible descendants of `idx` by `dx`
    fn shift_subtree(&self, tree: &mut LayoutTree, idx: NodeIdx, dx: f32) {
        let mut stack: Vec<NodeIdx> = tree
            .node(idx)
            .map(|n| n.state.visible_children().to_vec())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if let Some(node) = tree.node_mut(current) {
                node.x += dx;
                stack.extend(node.state.visible_children().iter().copied());
            }
        }
    }

    /// Horizontal extent of the visible subtree under `idx`, from stored positions
    pub fn subtree_span(&self, tree: &LayoutTree, idx: NodeIdx) -> Option<Span> {
        let node = tree.node(idx)?;
        let mut span = Span::around(node.x, self.config.slot_width(node.has_spouse()));
        for &child in node.state.visible_children() {
            if let Some(child_span) = self.subtree_span(tree, child) {
                span = span.union(child_span);
            }
        }
        Some(span)
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Visible nodes in output coordinates, depth-first order
    pub fn visible_nodes(&self, tree: &LayoutTree) -> Vec<VisibleNode> {
        let orientation = self.config.orientation;
        let extent = tree.extent();
        tree.visible()
            .into_iter()
            .filter_map(|idx| tree.node(idx))
            .map(|node| {
                let (x, y) = orientation.orient(node.x, node.y, extent);
                let (box_x, box_y) =
                    orientation.orient(self.member_box_x(node), node.y, extent);
                VisibleNode {
                    id: node.member.id.clone(),
                    x,
                    y,
                    box_x,
                    box_y,
                    label: node.member.display_name(),
                    is_deceased: node.member.is_deceased(),
                    has_attached_spouse: node.has_spouse(),
                    expansion_state: node.state.public(),
                    depth: node.depth,
                    spouse: node
                        .spouse
                        .as_ref()
                        .map(|spouse| self.spouse_box(node, spouse, extent)),
                }
            })
            .collect()
    }

    /// Parent-child edges to every visible child, plus spouse connectors
    pub fn edges(&self, tree: &LayoutTree) -> Vec<TreeEdge> {
        let orientation = self.config.orientation;
        let extent = tree.extent();
        let half_height = self.config.node_height / 2.0;
        let half_width = self.config.node_width / 2.0;
        let mut edges = Vec::new();

        for idx in tree.visible() {
            let Some(node) = tree.node(idx) else { continue };

            if let Some(spouse) = &node.spouse {
                let offset = self.config.spouse_offset / 2.0;
                let (source_x, source_y) =
                    orientation.orient(node.x - offset + half_width, node.y, extent);
                let (target_x, target_y) =
                    orientation.orient(node.x + offset - half_width, node.y, extent);
                edges.push(TreeEdge {
                    from_id: node.member.id.clone(),
                    to_id: spouse.id.clone(),
                    source_x,
                    source_y,
                    target_x,
                    target_y,
                    kind: EdgeKind::Spouse,
                });
            }

            for &child_idx in node.state.visible_children() {
                let Some(child) = tree.node(child_idx) else { continue };
                let (source_x, source_y) =
                    orientation.orient(node.x, node.y + half_height, extent);
                let (target_x, target_y) =
                    orientation.orient(self.member_box_x(child), child.y - half_height, extent);
                edges.push(TreeEdge {
                    from_id: node.member.id.clone(),
                    to_id: child.member.id.clone(),
                    source_x,
                    source_y,
                    target_x,
                    target_y,
                    kind: EdgeKind::ParentChild,
                });
            }
        }

        edges
    }

    /// Center of the member's own box along the sibling axis
    fn member_box_x(&self, node: &LayoutNode) -> f32 {
        if node.has_spouse() {
            node.x - self.config.spouse_offset / 2.0
        } else {
            node.x
        }
    }

    fn spouse_box(&self, node: &LayoutNode, spouse: &Member, extent: f32) -> SpouseBox {
        let (x, y) = self.config.orientation.orient(
            node.x + self.config.spouse_offset / 2.0,
            node.y,
            extent,
        );
        SpouseBox {
            id: spouse.id.clone(),
            label: spouse.display_name(),
            is_deceased: spouse.is_deceased(),
            x,
            y,
        }
    }
}
