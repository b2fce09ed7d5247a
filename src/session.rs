//! Visualization session
//!
//! The single entry point a renderer talks to. A session owns the current
//! record index, the stateful layout tree, the cascade scheduler and the
//! subscriber list. Every state change ends in one layout pass, which
//! refreshes the cached [`LayoutSnapshot`] and notifies subscribers.
//!
//! Everything runs on the caller's thread. Cascade steps only advance when the
//! host calls [`FamilyTreeSession::advance`].

use serde::Serialize;
use std::time::Duration;

use family_types::{Member, MemberId};

use crate::config::ForestConfig;
use crate::events::{EmitterStats, LayoutEmitter, LayoutEvent, LayoutPass, LayoutReceiver};
use crate::hierarchy::{build_hierarchy, record_warnings, DataQualityWarning};
use crate::layout::{
    CascadeReveal, CascadeStep, ExpansionState, LayoutEngine, LayoutTree, TreeEdge, ViewportFit,
    ViewportTransform, VisibleNode,
};
use crate::records::RecordIndex;

/// Everything a renderer needs to paint one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub nodes: Vec<VisibleNode>,
    pub edges: Vec<TreeEdge>,
    pub viewport: ViewportTransform,
}

/// Outcome of a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TreeStatus {
    /// A tree is loaded
    Ready { roots: usize, nodes: usize },
    /// No founder in the snapshot; output lists are empty
    NoFounder,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a cascading reveal is in progress")]
    CascadeInProgress,

    #[error("no node shows member {0}")]
    UnknownNode(MemberId),

    #[error("no family tree is loaded")]
    NoTree,
}

pub struct FamilyTreeSession {
    config: ForestConfig,
    index: RecordIndex,
    tree: Option<LayoutTree>,
    engine: LayoutEngine,
    fit: ViewportFit,
    cascade: CascadeReveal,
    emitter: LayoutEmitter,
    warnings: Vec<DataQualityWarning>,
    status: TreeStatus,
    snapshot: LayoutSnapshot,
}

impl FamilyTreeSession {
    /// Empty session; call [`FamilyTreeSession::rebuild`] to load records
    pub fn new(config: ForestConfig) -> Self {
        Self {
            engine: LayoutEngine::new(config.layout.clone()),
            fit: ViewportFit::new(config.viewport.clone()),
            cascade: CascadeReveal::new(config.cascade.level_delay()),
            config,
            index: RecordIndex::default(),
            tree: None,
            emitter: LayoutEmitter::new(),
            warnings: Vec::new(),
            status: TreeStatus::NoFounder,
            snapshot: LayoutSnapshot::default(),
        }
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// Replace everything with a new record snapshot.
    ///
    /// Cancels a running cascade and resets expansion state: roots expanded,
    /// every other node collapsed.
    pub fn rebuild(&mut self, records: Vec<Member>) -> TreeStatus {
        self.cascade.cancel();
        self.index = RecordIndex::build(records);
        self.warnings = record_warnings(&self.index);

        match build_hierarchy(&self.index, &self.config.hierarchy) {
            Ok(family_tree) => {
                self.status = TreeStatus::Ready {
                    roots: family_tree.roots.len(),
                    nodes: family_tree.node_count(),
                };
                self.tree = Some(LayoutTree::from_family_tree(&family_tree));
                self.warnings.extend(family_tree.warnings);
            }
            Err(err) => {
                tracing::warn!(error = %err, "rebuild without a tree");
                let warning = DataQualityWarning::NoFounder;
                warning.log();
                self.warnings.push(warning);
                self.status = TreeStatus::NoFounder;
                self.tree = None;
            }
        }

        tracing::info!(
            records = self.index.len(),
            status = ?self.status,
            warnings = self.warnings.len(),
            "family tree rebuilt"
        );
        self.relayout(LayoutPass::Rebuilt);
        self.status
    }

    /// Flip a node between collapsed and expanded. `id` may also name the
    /// attached spouse of the node. Leaf nodes are left alone.
    pub fn toggle(&mut self, id: &str) -> Result<ExpansionState, SessionError> {
        self.ensure_idle("toggle")?;
        let tree = self.tree.as_mut().ok_or(SessionError::NoTree)?;
        let idx = tree
            .lookup(id)
            .ok_or_else(|| SessionError::UnknownNode(MemberId::from(id)))?;
        let state = tree
            .toggle(idx)
            .ok_or_else(|| SessionError::UnknownNode(MemberId::from(id)))?;

        if state.is_toggleable() {
            tracing::debug!(id, state = state.as_str(), "node toggled");
            self.relayout(LayoutPass::Toggled);
        }
        Ok(state)
    }

    /// Start revealing the tree level by level. The first level is applied
    /// now; the rest follow through [`FamilyTreeSession::advance`]. Returns
    /// the number of levels in the cascade (0 when everything is expanded).
    pub fn request_cascade_expand(&mut self) -> Result<usize, SessionError> {
        self.ensure_idle("cascade expand")?;
        let tree = self.tree.as_ref().ok_or(SessionError::NoTree)?;

        let Some((first, last)) = tree.collapsed_depth_range() else {
            return Ok(0);
        };
        let Some(step) = self.cascade.start(first, last) else {
            return Ok(0);
        };

        tracing::info!(first, last, "cascade expand started");
        self.apply_step(step);
        Ok((last - first) as usize + 1)
    }

    /// Collapse everything below the roots in one pass
    pub fn request_collapse_all(&mut self) -> Result<(), SessionError> {
        self.ensure_idle("collapse all")?;
        let tree = self.tree.as_mut().ok_or(SessionError::NoTree)?;
        tree.reset();

        tracing::info!("collapsed to roots");
        self.relayout(LayoutPass::CollapsedAll);
        Ok(())
    }

    /// Drive scheduled cascade steps. Returns how many were applied.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let steps = self.cascade.advance(dt);
        let applied = steps.len();
        for step in steps {
            self.apply_step(step);
        }
        applied
    }

    /// Resize the drawing area and re-center
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.fit.set_size(width, height);
        self.relayout(LayoutPass::Resized);
    }

    pub fn subscribe(&mut self, buffer: usize) -> LayoutReceiver {
        self.emitter.subscribe(buffer)
    }

    fn ensure_idle(&self, request: &str) -> Result<(), SessionError> {
        if self.cascade.is_active() {
            tracing::warn!(request, "rejected while a cascade is in progress");
            return Err(SessionError::CascadeInProgress);
        }
        Ok(())
    }

    fn apply_step(&mut self, step: CascadeStep) {
        if let Some(tree) = self.tree.as_mut() {
            let expanded = tree.expand_to_depth(step.level);
            tracing::debug!(level = step.level, expanded, remaining = step.remaining, "cascade step");
        }
        self.relayout(LayoutPass::CascadeStep {
            level: step.level,
            remaining: step.remaining,
        });
    }

    /// Position, project, fit and notify
    fn relayout(&mut self, pass: LayoutPass) {
        self.snapshot = match self.tree.as_mut() {
            Some(tree) => {
                self.engine.layout(tree);
                let nodes = self.engine.visible_nodes(tree);
                let edges = self.engine.edges(tree);
                let viewport = self.fit.fit_nodes(&nodes, self.engine.config());
                LayoutSnapshot {
                    nodes,
                    edges,
                    viewport,
                }
            }
            None => LayoutSnapshot {
                viewport: self.fit.fit_nodes(&[], self.engine.config()),
                ..LayoutSnapshot::default()
            },
        };

        self.emitter.emit(LayoutEvent {
            pass,
            snapshot: self.snapshot.clone(),
        });
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    pub fn is_animating(&self) -> bool {
        self.cascade.is_active()
    }

    /// Time until the next cascade step is due
    pub fn next_step_in(&self) -> Option<Duration> {
        self.cascade.next_due()
    }

    pub fn status(&self) -> TreeStatus {
        self.status
    }

    pub fn visible_nodes(&self) -> &[VisibleNode] {
        &self.snapshot.nodes
    }

    pub fn edges(&self) -> &[TreeEdge] {
        &self.snapshot.edges
    }

    pub fn viewport(&self) -> ViewportTransform {
        self.snapshot.viewport
    }

    pub fn snapshot(&self) -> &LayoutSnapshot {
        &self.snapshot
    }

    /// Record and hierarchy findings of the last rebuild
    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    pub fn layout_tree(&self) -> Option<&LayoutTree> {
        self.tree.as_ref()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn emitter_stats(&self) -> EmitterStats {
        self.emitter.stats()
    }
}
