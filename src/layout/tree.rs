//! Expansion state machine
//!
//! The resolved forest flattened into an arena. Each node carries an explicit
//! tagged state: `Expanded(children)`, `Collapsed(hidden_children)` or `Leaf`.
//! Toggling moves the same child vector between the two non-leaf variants, so
//! collapsing and re-expanding restores exactly the children that were there.

use std::collections::HashMap;

use family_types::{Member, MemberId};

use crate::hierarchy::{FamilyTree, ResolvedNode};

use super::ExpansionState;

/// Arena index of a layout node
pub type NodeIdx = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Children visible
    Expanded(Vec<NodeIdx>),
    /// Children hidden, kept verbatim for the next expand
    Collapsed(Vec<NodeIdx>),
    /// No children at all
    Leaf,
}

impl NodeState {
    fn from_children(children: Vec<NodeIdx>, expanded: bool) -> Self {
        match (children.is_empty(), expanded) {
            (true, _) => NodeState::Leaf,
            (false, true) => NodeState::Expanded(children),
            (false, false) => NodeState::Collapsed(children),
        }
    }

    pub fn public(&self) -> ExpansionState {
        match self {
            NodeState::Expanded(_) => ExpansionState::Expanded,
            NodeState::Collapsed(_) => ExpansionState::Collapsed,
            NodeState::Leaf => ExpansionState::Leaf,
        }
    }

    /// Children that take part in layout
    pub fn visible_children(&self) -> &[NodeIdx] {
        match self {
            NodeState::Expanded(children) => children,
            NodeState::Collapsed(_) | NodeState::Leaf => &[],
        }
    }

    /// Stored children regardless of visibility
    pub fn children(&self) -> &[NodeIdx] {
        match self {
            NodeState::Expanded(children) | NodeState::Collapsed(children) => children,
            NodeState::Leaf => &[],
        }
    }
}

/// A resolved member with its layout state and last computed position
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub member: Member,
    /// Married-in partner drawn beside this node
    pub spouse: Option<Member>,
    pub parent: Option<NodeIdx>,
    /// Distance from the tree root, root = 0
    pub depth: u32,
    pub state: NodeState,
    /// Partnership center across the generation axis
    pub x: f32,
    /// Position along the generation axis
    pub y: f32,
}

impl LayoutNode {
    pub fn has_spouse(&self) -> bool {
        self.spouse.is_some()
    }
}

/// Flattened, stateful view of a [`FamilyTree`]
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
    roots: Vec<NodeIdx>,
    /// Member id (and attached spouse id) → node
    by_id: HashMap<MemberId, NodeIdx>,
    /// Width across generations covered by the last layout pass
    extent: f32,
}

impl LayoutTree {
    /// Flatten the forest; roots start expanded, everything else collapsed
    pub fn from_family_tree(tree: &FamilyTree) -> Self {
        let mut layout = Self::default();
        for root in &tree.roots {
            let idx = layout.insert(root, None, 0);
            layout.roots.push(idx);
        }
        layout
    }

    fn insert(&mut self, node: &ResolvedNode, parent: Option<NodeIdx>, depth: u32) -> NodeIdx {
        let idx = self.nodes.len();
        self.nodes.push(LayoutNode {
            member: node.member.clone(),
            spouse: node.attached_spouse.as_ref().map(|s| s.member.clone()),
            parent,
            depth,
            state: NodeState::Leaf,
            x: 0.0,
            y: 0.0,
        });
        self.by_id.insert(node.member.id.clone(), idx);
        if let Some(spouse) = &node.attached_spouse {
            self.by_id.insert(spouse.member.id.clone(), idx);
        }

        let children: Vec<NodeIdx> = node
            .children
            .iter()
            .map(|child| self.insert(child, Some(idx), depth + 1))
            .collect();
        self.nodes[idx].state = NodeState::from_children(children, parent.is_none());
        idx
    }

    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    /// Laid-out width across generations, 0 before the first layout pass
    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub(crate) fn set_extent(&mut self, extent: f32) {
        self.extent = extent;
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&LayoutNode> {
        self.nodes.get(idx)
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(idx)
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node showing `id`, either as member or as attached spouse
    pub fn lookup(&self, id: &str) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    pub fn state(&self, idx: NodeIdx) -> Option<ExpansionState> {
        self.nodes.get(idx).map(|n| n.state.public())
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Flip Collapsed ⇄ Expanded; Leaf stays Leaf. Returns the new state.
    pub fn toggle(&mut self, idx: NodeIdx) -> Option<ExpansionState> {
        let node = self.nodes.get_mut(idx)?;
        node.state = match std::mem::replace(&mut node.state, NodeState::Leaf) {
            NodeState::Expanded(children) => NodeState::Collapsed(children),
            NodeState::Collapsed(children) => NodeState::Expanded(children),
            NodeState::Leaf => NodeState::Leaf,
        };
        Some(node.state.public())
    }

    /// Expand if collapsed. Returns whether anything changed.
    pub fn expand(&mut self, idx: NodeIdx) -> bool {
        let collapsed = matches!(
            self.nodes.get(idx).map(|n| &n.state),
            Some(NodeState::Collapsed(_))
        );
        collapsed && self.toggle(idx).is_some()
    }

    /// Collapse if expanded. Returns whether anything changed.
    pub fn collapse(&mut self, idx: NodeIdx) -> bool {
        let expanded = matches!(
            self.nodes.get(idx).map(|n| &n.state),
            Some(NodeState::Expanded(_))
        );
        expanded && self.toggle(idx).is_some()
    }

    /// Back to the initial state: roots expanded, every other node collapsed
    pub fn reset(&mut self) {
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].parent.is_none() {
                self.expand(idx);
            } else {
                self.collapse(idx);
            }
        }
    }

    /// Expand every collapsed node at or above `depth`. Returns how many changed.
    pub fn expand_to_depth(&mut self, depth: u32) -> usize {
        let mut changed = 0;
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].depth <= depth && self.expand(idx) {
                changed += 1;
            }
        }
        changed
    }

    /// Shallowest and deepest depth among collapsed nodes
    pub fn collapsed_depth_range(&self) -> Option<(u32, u32)> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.state, NodeState::Collapsed(_)))
            .map(|n| n.depth)
            .fold(None, |range, depth| match range {
                None => Some((depth, depth)),
                Some((lo, hi)) => Some((lo.min(depth), hi.max(depth))),
            })
    }

    /// Visible nodes in depth-first, left-to-right order
    pub fn visible(&self) -> Vec<NodeIdx> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeIdx> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.nodes[idx].state.visible_children().iter().rev());
        }
        order
    }
}
