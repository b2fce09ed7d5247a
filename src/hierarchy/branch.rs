//! Branch grouping and depth-first display order
//!
//! Flat list views show each branch as one list in family order: a member,
//! then its spouse, then its children, depth first. Spouse links are rebuilt
//! from the branch's own members so that a partner recorded in another branch
//! does not pull members out of this one.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use family_types::{BranchId, Member, MemberId};

use crate::config::BranchConfig;
use crate::records::{MarriageResolver, RecordIndex, SpouseLinks};

/// One branch of the roster, members in family order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchGroup<'a> {
    pub branch_id: BranchId,
    pub label: String,
    pub members: Vec<&'a Member>,
}

/// Split members by branch (ascending id) and order each branch depth first
pub fn group_by_branch<'a>(
    index: &'a RecordIndex,
    members: impl IntoIterator<Item = &'a Member>,
    branches: &BranchConfig,
) -> Vec<BranchGroup<'a>> {
    let mut grouped: BTreeMap<BranchId, Vec<&'a Member>> = BTreeMap::new();
    for member in members {
        grouped.entry(member.branch()).or_default().push(member);
    }

    grouped
        .into_iter()
        .map(|(branch_id, subset)| BranchGroup {
            branch_id,
            label: branches.label(branch_id).into_owned(),
            members: order_branch(index, &subset),
        })
        .collect()
}

/// Depth-first family order of one branch's members.
///
/// Every member of `subset` appears exactly once; members the traversal never
/// reaches are appended in their original order.
pub fn order_branch<'a>(index: &'a RecordIndex, subset: &[&'a Member]) -> Vec<&'a Member> {
    let links = SpouseLinks::from_members(subset.iter().copied());
    let resolver = MarriageResolver::with_links(index, &links);
    let in_subset: HashSet<&MemberId> = subset.iter().map(|m| &m.id).collect();

    let mut walk = BranchWalk {
        subset,
        links: &links,
        resolver,
        in_subset,
        visited: HashSet::with_capacity(subset.len()),
        result: Vec::with_capacity(subset.len()),
    };

    let mut roots: Vec<&'a Member> = subset
        .iter()
        .copied()
        .filter(|m| !walk.resolver.is_married_in(m))
        .filter(|m| match index.parent_of(m) {
            None => true,
            Some(parent) => parent.branch() != m.branch(),
        })
        .collect();
    roots.sort_by_key(|m| m.generation);

    for root in roots {
        walk.visit(root);
    }

    for &member in subset {
        if walk.visited.insert(member.id.clone()) {
            walk.result.push(member);
        }
    }

    walk.result
}

struct BranchWalk<'a, 's> {
    subset: &'s [&'a Member],
    links: &'s SpouseLinks,
    resolver: MarriageResolver<'s>,
    in_subset: HashSet<&'s MemberId>,
    visited: HashSet<MemberId>,
    result: Vec<&'a Member>,
}

impl<'a, 's> BranchWalk<'a, 's> {
    fn visit(&mut self, person: &'a Member) {
        if !self.visited.insert(person.id.clone()) {
            return;
        }
        self.result.push(person);

        let partner_id = self.links.partner(person.id.as_str()).cloned();
        if let Some(spouse) = partner_id.as_ref().and_then(|id| self.member(id)) {
            if self.visited.insert(spouse.id.clone()) {
                self.result.push(spouse);
            }
        }

        let mut children: Vec<&'a Member> = self
            .subset
            .iter()
            .copied()
            .filter(|m| !self.visited.contains(&m.id))
            .filter(|m| !self.resolver.is_married_in(m))
            .filter(|m| match &m.parent_id {
                Some(parent_id) => {
                    parent_id == &person.id || Some(parent_id) == partner_id.as_ref()
                }
                None => false,
            })
            .collect();
        children.sort_by(|a, b| self.child_order(a, b));

        for child in children {
            self.visit(child);
        }
    }

    fn member(&self, id: &MemberId) -> Option<&'a Member> {
        if !self.in_subset.contains(id) {
            return None;
        }
        self.subset.iter().copied().find(|m| &m.id == id)
    }

    /// Unmarried first, then birth date ascending (undated last), then id
    fn child_order(&self, a: &Member, b: &Member) -> Ordering {
        let a_married = self.links.contains(a.id.as_str());
        let b_married = self.links.contains(b.id.as_str());

        a_married
            .cmp(&b_married)
            .then_with(|| match (&a.birth_date, &b.birth_date) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.id.cmp(&b.id))
    }
}
