//! Record index
//!
//! An arena of member records plus the derived lookup maps (id, parent,
//! spouse). The index is rebuilt wholesale from every snapshot; nothing is
//! patched in place.

use std::collections::HashMap;

use family_types::{Member, MemberId};

// =============================================================================
// SPOUSE LINKS
// =============================================================================

/// Bidirectional spouse pairing.
///
/// Every declared `spouse_id` is registered in both directions, so a
/// one-directional link A→B still lets B resolve back to A. Later declarations
/// overwrite earlier ones. Self links are never registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpouseLinks {
    partners: HashMap<MemberId, MemberId>,
}

impl SpouseLinks {
    /// Register the links declared by a set of members
    pub fn from_members<'a>(members: impl IntoIterator<Item = &'a Member>) -> Self {
        let mut links = Self::default();
        for member in members {
            if let Some(spouse_id) = &member.spouse_id {
                links.link(&member.id, spouse_id);
            }
        }
        links
    }

    fn link(&mut self, a: &MemberId, b: &MemberId) {
        if a == b {
            return;
        }
        self.partners.insert(a.clone(), b.clone());
        self.partners.insert(b.clone(), a.clone());
    }

    /// Partner id registered for a member, resolvable or not
    pub fn partner(&self, id: &str) -> Option<&MemberId> {
        self.partners.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.partners.contains_key(id)
    }

    /// Number of registered directions (two per pair)
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

// =============================================================================
// RECORD INDEX
// =============================================================================

/// Lookup structures over one record snapshot
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    /// Arena, in snapshot order
    members: Vec<Member>,
    /// id → arena position
    by_id: HashMap<MemberId, usize>,
    /// parent id → arena positions of children, snapshot order; shadowed duplicates excluded
    children: HashMap<MemberId, Vec<usize>>,
    spouses: SpouseLinks,
}

impl RecordIndex {
    /// Build every lookup in one pass over the snapshot
    pub fn build(members: Vec<Member>) -> Self {
        let mut by_id = HashMap::with_capacity(members.len());
        let mut children: HashMap<MemberId, Vec<usize>> = HashMap::new();

        for (position, member) in members.iter().enumerate() {
            if by_id.contains_key(&member.id) {
                tracing::warn!(id = %member.id, "duplicate member id, keeping first record");
                continue;
            }
            by_id.insert(member.id.clone(), position);
            if let Some(parent_id) = &member.parent_id {
                children.entry(parent_id.clone()).or_default().push(position);
            }
        }

        let spouses = SpouseLinks::from_members(&members);

        tracing::debug!(
            members = members.len(),
            parents = children.len(),
            spouse_links = spouses.len(),
            "record index built"
        );

        Self {
            members,
            by_id,
            children,
            spouses,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.by_id.get(id).map(|&position| &self.members[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Arena position of a member, i.e. its snapshot order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Records naming `parent_id` as their parent, in snapshot order
    pub fn children_of<'a>(&'a self, parent_id: &str) -> impl Iterator<Item = &'a Member> + 'a {
        self.children
            .get(parent_id)
            .into_iter()
            .flatten()
            .map(|&position| &self.members[position])
    }

    /// Resolved parent; dangling references resolve to `None`
    pub fn parent_of(&self, member: &Member) -> Option<&Member> {
        member.parent_id.as_ref().and_then(|id| self.get(id.as_str()))
    }

    pub fn spouse_links(&self) -> &SpouseLinks {
        &self.spouses
    }

    /// Resolvable partner through the global links
    pub fn partner_of(&self, member: &Member) -> Option<&Member> {
        self.spouses
            .partner(member.id.as_str())
            .and_then(|id| self.get(id.as_str()))
            .filter(|partner| partner.id != member.id)
    }

    /// Generation-1 members in snapshot order, shadowed duplicates skipped
    pub fn founders(&self) -> Vec<&Member> {
        self.members
            .iter()
            .enumerate()
            .filter(|(position, m)| m.is_founder() && self.position(m.id.as_str()) == Some(*position))
            .map(|(_, m)| m)
            .collect()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
