//! Hierarchy builder
//!
//! Turns the indexed snapshot into an ordered forest of [`ResolvedNode`]s.
//! Blood descendants form the spine; married-in partners are attached beside
//! the member they married and never recursed into.
//!
//! Recursion is bounded three ways: a set of already placed members (each
//! member appears at most once), the current ancestor path (parent cycles)
//! and a hard depth cap.

use std::cmp::Ordering;
use std::collections::HashSet;

use family_types::{Member, MemberId};

use crate::config::HierarchyConfig;
use crate::records::{MarriageResolver, RecordIndex};

use super::diagnostics::DataQualityWarning;

// =============================================================================
// TYPES
// =============================================================================

/// A member placed in the resolved tree
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub member: Member,
    /// Blood descendants, display order
    pub children: Vec<ResolvedNode>,
    pub is_married_in: bool,
    /// Married-in partner rendered beside this member
    pub attached_spouse: Option<Box<ResolvedNode>>,
}

impl ResolvedNode {
    fn leaf(member: &Member, is_married_in: bool) -> Self {
        Self {
            member: member.clone(),
            children: Vec::new(),
            is_married_in,
            attached_spouse: None,
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.member.id
    }

    /// Blood nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ResolvedNode::node_count).sum::<usize>()
    }

    /// Rendered members in this subtree, attached spouses included
    pub fn member_count(&self) -> usize {
        1 + usize::from(self.attached_spouse.is_some())
            + self.children.iter().map(ResolvedNode::member_count).sum::<usize>()
    }

    /// Levels below and including this node
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(ResolvedNode::height).max().unwrap_or(0)
    }

    /// Find a blood node or attached spouse by id
    pub fn find(&self, id: &str) -> Option<&ResolvedNode> {
        if self.member.id.as_str() == id {
            return Some(self);
        }
        if let Some(spouse) = &self.attached_spouse {
            if spouse.member.id.as_str() == id {
                return Some(spouse);
            }
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// The resolved forest plus everything noticed while building it
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyTree {
    /// Founder trees, the primary founder first
    pub roots: Vec<ResolvedNode>,
    pub warnings: Vec<DataQualityWarning>,
}

impl FamilyTree {
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(ResolvedNode::node_count).sum()
    }

    pub fn member_count(&self) -> usize {
        self.roots.iter().map(ResolvedNode::member_count).sum()
    }

    pub fn find(&self, id: &str) -> Option<&ResolvedNode> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Number of generations in the deepest tree
    pub fn depth(&self) -> usize {
        self.roots.iter().map(ResolvedNode::height).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("no generation-1 founder in {member_count} records")]
    NoFounder { member_count: usize },
}

// =============================================================================
// BUILD
// =============================================================================

/// Recursion state threaded through the build
struct BuildContext<'a> {
    index: &'a RecordIndex,
    resolver: MarriageResolver<'a>,
    placed: HashSet<MemberId>,
    ancestors: Vec<MemberId>,
    max_depth: u32,
    warnings: Vec<DataQualityWarning>,
}

impl<'a> BuildContext<'a> {
    fn warn(&mut self, warning: DataQualityWarning) {
        warning.log();
        self.warnings.push(warning);
    }

    fn build_node(&mut self, member: &'a Member, depth: u32) -> ResolvedNode {
        self.placed.insert(member.id.clone());

        let is_married_in = self.resolver.is_married_in(member);
        let mut node = ResolvedNode::leaf(member, is_married_in);

        let attached = self
            .resolver
            .attached_partner(member)
            .filter(|partner| !self.placed.contains(&partner.id));
        if let Some(partner) = attached {
            self.placed.insert(partner.id.clone());
            node.attached_spouse = Some(Box::new(ResolvedNode::leaf(partner, true)));
        }

        let candidates = self.child_candidates(member);
        if candidates.is_empty() {
            return node;
        }
        if depth + 1 >= self.max_depth {
            self.warn(DataQualityWarning::DepthLimitReached {
                id: member.id.clone(),
                depth,
            });
            return node;
        }

        for child in &candidates {
            self.placed.insert(child.id.clone());
        }

        self.ancestors.push(member.id.clone());
        node.children = candidates
            .into_iter()
            .map(|child| self.build_node(child, depth + 1))
            .collect();
        self.ancestors.pop();

        node
    }

    /// Children of the member or of its partner, filtered and sorted
    fn child_candidates(&mut self, member: &'a Member) -> Vec<&'a Member> {
        let index = self.index;
        let partner = self.resolver.partner_of(member);

        let mut candidates = Vec::new();
        let parents = std::iter::once(member).chain(partner);
        for parent in parents {
            for child in index.children_of(parent.id.as_str()) {
                if self.ancestors.contains(&child.id) || child.id == member.id {
                    self.warn(DataQualityWarning::ParentCycle {
                        id: child.id.clone(),
                        parent_id: parent.id.clone(),
                    });
                    continue;
                }
                if self.placed.contains(&child.id) || self.resolver.is_married_in(child) {
                    continue;
                }
                if candidates.iter().any(|c: &&Member| c.id == child.id) {
                    continue;
                }
                candidates.push(child);
            }
        }

        candidates.sort_by(|a, b| reverse_birth_order(a, b));
        candidates
    }
}

/// Latest birth date first; members without a birth date before all others
fn reverse_birth_order(a: &Member, b: &Member) -> Ordering {
    match (&a.birth_date, &b.birth_date) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(x),
    }
}

/// Resolve the indexed snapshot into a forest rooted at the founders
pub fn build_hierarchy(
    index: &RecordIndex,
    config: &HierarchyConfig,
) -> Result<FamilyTree, HierarchyError> {
    let founders = index.founders();
    if founders.is_empty() {
        tracing::warn!(records = index.len(), "no founder found");
        return Err(HierarchyError::NoFounder {
            member_count: index.len(),
        });
    }

    let resolver = MarriageResolver::new(index);
    let mut roots: Vec<&Member> = founders
        .iter()
        .copied()
        .filter(|founder| !resolver.is_married_in(founder))
        .collect();
    if roots.is_empty() {
        roots.push(founders[0]);
    }

    let mut ctx = BuildContext {
        index,
        resolver,
        placed: HashSet::with_capacity(index.len()),
        ancestors: Vec::new(),
        max_depth: config.max_depth.max(1),
        warnings: Vec::new(),
    };

    if roots.len() > 1 {
        ctx.warn(DataQualityWarning::MultipleFounders {
            ids: roots.iter().map(|m| m.id.clone()).collect(),
        });
    }

    let mut trees = Vec::with_capacity(roots.len());
    for root in roots {
        if ctx.placed.contains(&root.id) {
            continue;
        }
        trees.push(ctx.build_node(root, 0));
    }

    let unreachable: Vec<MemberId> = index
        .members()
        .iter()
        .filter(|m| !ctx.placed.contains(&m.id))
        .map(|m| m.id.clone())
        .collect();
    for id in unreachable {
        ctx.warn(DataQualityWarning::Unreachable { id });
    }

    let tree = FamilyTree {
        roots: trees,
        warnings: ctx.warnings,
    };

    tracing::debug!(
        roots = tree.roots.len(),
        nodes = tree.node_count(),
        members = tree.member_count(),
        warnings = tree.warnings.len(),
        "hierarchy built"
    );

    Ok(tree)
}
